pub mod logging;
pub mod dice;
pub mod rules;
pub mod character_gen;
