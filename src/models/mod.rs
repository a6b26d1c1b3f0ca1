pub mod openai;
pub mod talkai;
