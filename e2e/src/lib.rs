//! End-to-end scenarios of the EduShare client against a mocked backend.

#[cfg(test)]
mod tests;
