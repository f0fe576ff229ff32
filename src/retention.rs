//! Parsing of the `--retention` flag into a [`RetentionPolicy`].

use tracing::debug;

use crate::crd::RetentionPolicy;
use crate::error::BackupError;

/// Parse a retention string.
///
/// Accepted forms, case-insensitive:
/// - `""`: no policy
/// - `"<n>"` or `"number:<n>"`: keep at most `n` backups
/// - `"size:<gb>"`, optionally suffixed with `Gb`/`GiB`: keep up to `gb` GB
pub fn parse(input: &str) -> Result<Option<RetentionPolicy>, BackupError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        debug!("No retention policy requested");
        return Ok(None);
    }

    let (kind, amount) = match trimmed.split_once(':') {
        Some((kind, amount)) => (kind.trim().to_ascii_lowercase(), amount.trim()),
        None => ("number".to_string(), trimmed),
    };

    let policy = match kind.as_str() {
        "number" => RetentionPolicy::by_number(parse_amount(input, amount)?),
        "size" => {
            let lower = amount.to_ascii_lowercase();
            let digits = lower
                .strip_suffix("gib")
                .or_else(|| lower.strip_suffix("gb"))
                .unwrap_or(&lower)
                .trim();
            RetentionPolicy::by_size(parse_amount(input, digits)?)
        }
        other => {
            return Err(BackupError::InvalidRetention(format!(
                "unknown retention type '{}' in '{}', expected 'number' or 'size'",
                other, input
            )));
        }
    };

    debug!(retention_type = %policy.retention_type, "Parsed retention policy");
    Ok(Some(policy))
}

fn parse_amount(input: &str, amount: &str) -> Result<u32, BackupError> {
    match amount.parse::<u32>() {
        Ok(0) => Err(BackupError::InvalidRetention(format!(
            "'{}' must be greater than zero",
            input
        ))),
        Ok(n) => Ok(n),
        Err(_) => Err(BackupError::InvalidRetention(format!(
            "'{}' is not a positive integer amount",
            input
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::spec::RetentionType;

    #[test]
    fn test_empty_is_no_policy() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_bare_number() {
        assert_eq!(parse("5").unwrap(), Some(RetentionPolicy::by_number(5)));
    }

    #[test]
    fn test_number_prefix_case_insensitive() {
        assert_eq!(
            parse("Number: 7").unwrap(),
            Some(RetentionPolicy::by_number(7))
        );
    }

    #[test]
    fn test_size_with_and_without_suffix() {
        for input in ["size:10", "size:10Gb", "SIZE:10GiB", "size: 10 gb"] {
            let policy = parse(input).unwrap().unwrap();
            assert_eq!(policy.retention_type, RetentionType::RetentionSize, "{input}");
            assert_eq!(policy, RetentionPolicy::by_size(10));
        }
    }

    #[test]
    fn test_zero_rejected() {
        let err = parse("number:0").unwrap_err();
        assert!(matches!(err, BackupError::InvalidRetention(_)));
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse("forever").is_err());
        assert!(parse("size:lots").is_err());
        assert!(parse("-3").is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = parse("age:30").unwrap_err();
        assert!(err.to_string().contains("unknown retention type 'age'"));
    }
}
