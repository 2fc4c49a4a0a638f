use crate::error::FacterError;

pub fn print_error(message: &str) {
    eprintln!("\x1b[31m❌ Error: {}\x1b[0m", message);
}

/// Exit code for an error that ended the run.
pub fn exit_code(err: &FacterError) -> i32 {
    match err {
        FacterError::FatalEnvironment(_) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_non_zero() {
        assert_eq!(exit_code(&FacterError::FatalEnvironment("x".into())), 2);
        assert_eq!(exit_code(&FacterError::Serialization("x".into())), 1);
    }
}
