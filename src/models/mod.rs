pub mod answer;

pub use answer::{AnswerRecord, DayEntry};
