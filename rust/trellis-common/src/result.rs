//! Result alias and contract-check macros shared by the trellis crates.
//!
//! Two validation surfaces exist in this workspace: caller-supplied input
//! (row arity, cell types, variable-region capacity), checked with
//! [`verify_arg!`], and encoded payloads read back out of a block
//! (variable-region ranges), checked with [`verify_data!`].

pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Returns early with an `InvalidArgument` error when a condition on
/// caller-supplied input does not hold.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $cond:expr) => {
        if !$cond {
            return Err($crate::result::arg_violation(
                stringify!($name),
                stringify!($cond),
            ));
        }
    };
}

/// Returns early with an `InvalidFormat` error when an invariant of an
/// encoded payload does not hold.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $cond:expr) => {
        if !$cond {
            return Err($crate::result::data_violation(
                stringify!($name),
                stringify!($cond),
            ));
        }
    };
}

#[cold]
pub fn arg_violation(name: &str, condition: &str) -> crate::error::Error {
    crate::error::Error::invalid_arg(name, format!("violated {condition}"))
}

#[cold]
pub fn data_violation(element: &str, condition: &str) -> crate::error::Error {
    crate::error::Error::invalid_format(element, format!("violated {condition}"))
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_arity(count: usize) -> crate::Result<()> {
        verify_arg!(row, count == 3);
        Ok(())
    }

    fn check_payload(end: usize) -> crate::Result<()> {
        verify_data!(var_region, end <= 8);
        Ok(())
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_arity(3).is_ok());
        let err = check_arity(2).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "row");
                assert!(message.contains("count == 3"));
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_verify_data() {
        assert!(check_payload(8).is_ok());
        let err = check_payload(9).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
    }
}
