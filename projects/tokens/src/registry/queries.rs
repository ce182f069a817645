use serde_json::{Map, Value};
use thiserror::Error;

use crate::registry::models::TokenRecord;

pub fn find_token_by_id(tokens: &[TokenRecord], id_val: u32) -> Option<&TokenRecord> {
    tokens.iter().find(|token| token.id == id_val)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CastVoteError {
    #[error("TokenIdNotFound: {id}")]
    TokenIdNotFound { id: u32 },

    #[error("TokenAddressNotFound: {address}")]
    TokenAddressNotFound { address: String },
}

/// Adds one star to the token owning `address_val`.
///
/// A token with `id_val` must also exist, but it does not have to be the same
/// token: a vote `{id: 1, address: "B"}` stars whichever record holds `"B"`.
/// Awaiting product review before the lookups are tied together.
pub fn cast_vote<'a>(
    tokens: &'a mut [TokenRecord],
    id_val: u32,
    address_val: &str,
) -> Result<&'a TokenRecord, CastVoteError> {
    if find_token_by_id(tokens, id_val).is_none() {
        return Err(CastVoteError::TokenIdNotFound { id: id_val });
    }

    let token = tokens
        .iter_mut()
        .find(|token| token.address == address_val)
        .ok_or_else(|| CastVoteError::TokenAddressNotFound {
            address: address_val.to_string(),
        })?;

    token.stars = token.stars.saturating_add(1);
    Ok(token)
}

#[derive(Debug, Clone)]
pub struct NewToken {
    pub address: String,
    pub name: Value,
    pub quantity: Value,
    pub stars: u32,
}

/// Appends `new` with `id = len + 1`, without looking for gaps.
pub fn append_token(tokens: &mut Vec<TokenRecord>, new: NewToken) -> &TokenRecord {
    let id = u32::try_from(tokens.len()).unwrap_or(u32::MAX - 1) + 1;
    tokens.push(TokenRecord {
        id,
        address: new.address,
        name: new.name,
        quantity: new.quantity,
        stars: new.stars,
        extra: Map::new(),
    });
    &tokens[tokens.len() - 1]
}

/// `null`, `false`, `0` and `""` count as missing when validating request fields.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Vec<TokenRecord> {
        vec![
            TokenRecord::new(1, "A", "alpha", json!(10), 0),
            TokenRecord::new(2, "B", "beta", json!(20), 3),
        ]
    }

    #[test]
    fn vote_increments_the_record_matched_by_address() {
        let mut tokens = registry();

        let voted = cast_vote(&mut tokens, 1, "B").unwrap();

        assert_eq!(voted.id, 2);
        assert_eq!(voted.address, "B");
        assert_eq!(voted.stars, 4);
        assert_eq!(tokens[0].stars, 0);
        assert_eq!(tokens[1].stars, 4);
    }

    #[test]
    fn vote_requires_the_id_to_exist() {
        let mut tokens = registry();

        let err = cast_vote(&mut tokens, 9, "A").unwrap_err();

        assert_eq!(err, CastVoteError::TokenIdNotFound { id: 9 });
        assert_eq!(tokens[0].stars, 0);
    }

    #[test]
    fn vote_requires_the_address_to_exist() {
        let mut tokens = registry();

        let err = cast_vote(&mut tokens, 1, "Z").unwrap_err();

        assert_eq!(
            err,
            CastVoteError::TokenAddressNotFound {
                address: "Z".to_string()
            }
        );
    }

    #[test]
    fn append_assigns_length_plus_one() {
        let mut tokens = registry();
        tokens.remove(0);

        let created = append_token(
            &mut tokens,
            NewToken {
                address: String::new(),
                name: json!("gamma"),
                quantity: json!("7"),
                stars: 1,
            },
        );

        // id 2 already exists after the removal; the length rule still applies
        assert_eq!(created.id, 2);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn falsy_values_count_as_missing() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!([])));
    }
}
