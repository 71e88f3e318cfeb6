/// Compare a caller-supplied secret against the stored value in constant
/// time, so confirmation codes cannot be guessed character by character
/// through timing.
pub fn constant_time_eq(provided: &str, expected: &str) -> bool {
    provided.as_bytes().len() == expected.as_bytes().len()
        && provided
            .as_bytes()
            .iter()
            .zip(expected.as_bytes().iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
