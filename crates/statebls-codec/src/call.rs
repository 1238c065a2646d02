//! Selector dispatch over raw calldata.

use statebls_types::{Result, StateBlsError, constants};

use crate::{CorrectionPayload, PostPayload, Selector};

/// A decoded settlement call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Post(PostPayload),
    CorrectUpdate(CorrectionPayload),
}

impl Call {
    /// Route calldata to the decoder named by its first four bytes.
    ///
    /// # Errors
    /// - `MalformedPayload` if shorter than a selector, or if the payload
    ///   decoder rejects it
    /// - `UnknownSelector` for any other selector
    pub fn decode(calldata: &[u8]) -> Result<Self> {
        let Some(head) = calldata.get(..constants::SELECTOR_LEN) else {
            return Err(StateBlsError::malformed("calldata shorter than a selector"));
        };
        let mut raw = [0u8; constants::SELECTOR_LEN];
        raw.copy_from_slice(head);
        let selector = Selector(raw);

        if selector == Selector::post() {
            PostPayload::decode(calldata).map(Self::Post)
        } else if selector == Selector::correct_update() {
            CorrectionPayload::decode(calldata).map(Self::CorrectUpdate)
        } else {
            Err(StateBlsError::UnknownSelector {
                selector: selector.to_string(),
            })
        }
    }

    /// Name of the entry point, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::CorrectUpdate(_) => "correctUpdate",
        }
    }
}

#[cfg(test)]
mod tests {
    use statebls_bls::{BlsDomain, SecretKey};
    use statebls_types::{AccountIndex, Receipt};

    use super::*;
    use crate::Update;

    fn update() -> Update {
        let receipt = Receipt {
            a_index: AccountIndex(1),
            b_index: AccountIndex(2),
            amount: 10,
            expires_by: 100,
            seq_no: 1,
        };
        Update::sign(
            receipt,
            &BlsDomain::from_tag("test"),
            &SecretKey::from_seed(1),
            &SecretKey::from_seed(2),
        )
    }

    #[test]
    fn dispatches_post() {
        let bytes = PostPayload::from_updates(AccountIndex(1), &[update()])
            .unwrap()
            .encode()
            .unwrap();
        let call = Call::decode(&bytes).unwrap();
        assert!(matches!(call, Call::Post(_)));
        assert_eq!(call.name(), "post");
    }

    #[test]
    fn dispatches_correction() {
        let bytes = CorrectionPayload::new(update()).encode();
        let call = Call::decode(&bytes).unwrap();
        assert!(matches!(call, Call::CorrectUpdate(_)));
        assert_eq!(call.name(), "correctUpdate");
    }

    #[test]
    fn unknown_selector_rejected() {
        let err = Call::decode(&[0, 0, 0, 0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, StateBlsError::UnknownSelector { .. }));
    }

    #[test]
    fn empty_calldata_is_malformed() {
        assert!(matches!(
            Call::decode(&[]).unwrap_err(),
            StateBlsError::MalformedPayload { .. }
        ));
    }
}
