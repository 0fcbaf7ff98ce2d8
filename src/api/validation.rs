use super::ApiError;
use crate::domain::MalId;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

pub fn validate_mal_id(id: i32) -> Result<MalId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid MAL ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(MalId::new(id))
}

pub fn validate_limit(limit: Option<u64>) -> Result<u64, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            limit, MAX_LIMIT
        )));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mal_id() {
        assert_eq!(validate_mal_id(1535).unwrap(), MalId::new(1535));
        assert!(validate_mal_id(0).is_err());
        assert!(validate_mal_id(-1).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(validate_limit(Some(1)).unwrap(), 1);
        assert_eq!(validate_limit(Some(100)).unwrap(), 100);
        assert!(validate_limit(Some(0)).is_err());
        assert!(validate_limit(Some(101)).is_err());
    }
}
