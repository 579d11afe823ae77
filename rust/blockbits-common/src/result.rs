use crate::error::StatusCode;

pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_format(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn invalid_format(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidFormat {
        element: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

/// Status code of an engine result: `Ok` on success, otherwise the
/// code of the error.
pub fn status_of<T>(result: &Result<T>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::Ok,
        Err(e) => e.status(),
    }
}

/// Interprets an integer bit value. Only 0 and 1 are accepted.
pub fn bit_value(value: i32) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(crate::error::Error::invalid_arg(
            "value",
            format!("bit value must be 0 or 1, got {value}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(n: i64) -> Result<i64> {
        verify_arg!(n, n > 0);
        Ok(n)
    }

    fn check_header(len: usize) -> Result<()> {
        verify_data!(header, len >= 8);
        Ok(())
    }

    #[test]
    fn test_verify_macros() {
        assert_eq!(check_positive(3).unwrap(), 3);
        let err = check_positive(-1).unwrap_err();
        assert_eq!(err.status(), StatusCode::BadArgument);
        assert!(err.to_string().contains("n > 0"));

        assert!(check_header(8).is_ok());
        assert_eq!(check_header(2).unwrap_err().status(), StatusCode::BadArgument);
    }

    #[test]
    fn test_bit_value() {
        assert!(!bit_value(0).unwrap());
        assert!(bit_value(1).unwrap());
        assert_eq!(
            status_of(&bit_value(2)),
            StatusCode::BadArgument
        );
        assert_eq!(status_of(&bit_value(1)), StatusCode::Ok);
    }
}
