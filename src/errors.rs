use std::{
    fmt::Display,
    io::{Error as IoError, ErrorKind},
};

#[derive(Debug, Clone, PartialEq)]
pub enum HeapError {
    BadLevels(usize),
    BadSpeed(f64),
    BadValue(u32),
    DuplicateValue(u32),
    IncorrectMove(usize, usize),
    InvalidMove(usize, usize),
    TooManyValues(usize),
}

impl HeapError {
    /// Configuration errors abort the request and leave the session untouched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HeapError::BadLevels(_)
                | HeapError::BadSpeed(_)
                | HeapError::BadValue(_)
                | HeapError::DuplicateValue(_)
                | HeapError::TooManyValues(_)
        )
    }

    /// Practice mistakes; the session carries on after these.
    pub fn is_mistake(&self) -> bool {
        matches!(
            self,
            HeapError::IncorrectMove(_, _) | HeapError::InvalidMove(_, _)
        )
    }
}

impl Display for HeapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeapError::BadLevels(levels) => {
                write!(f, "Unsupported number of levels {} (expected 2 to 6)", levels)
            }
            HeapError::BadSpeed(speed) => {
                write!(
                    f,
                    "Speed factor must be at least {} (got {})",
                    crate::controls::MIN_SPEED,
                    speed
                )
            }
            HeapError::BadValue(v) => {
                write!(
                    f,
                    "Value {} is outside 0..{}",
                    v,
                    crate::heap::VALUE_DOMAIN
                )
            }
            HeapError::DuplicateValue(v) => write!(f, "Value {} appears more than once", v),
            HeapError::IncorrectMove(i, j) => {
                write!(f, "Incorrect swap! ({}, {}) is not the next swap", i, j)
            }
            HeapError::InvalidMove(i, j) => {
                write!(f, "Invalid swap: {} and {} are not parent and child", i, j)
            }
            HeapError::TooManyValues(n) => {
                write!(
                    f,
                    "Cannot draw {} distinct values from 0..{}",
                    n,
                    crate::heap::VALUE_DOMAIN
                )
            }
        }
    }
}

impl std::error::Error for HeapError {}

pub fn as_io_error(error: HeapError) -> std::io::Error {
    IoError::new(ErrorKind::Other, error)
}
