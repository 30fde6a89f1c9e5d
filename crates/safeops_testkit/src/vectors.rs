//! Shared test vectors.
//!
//! Fixed inputs with their expected outcome, so every surface (slice API,
//! C ABI, bindings) can be checked against the same table.

use safeops_core::ErrorKind;

/// Binary `i32` operation exercised by an [`ArithVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

/// An arithmetic test vector.
#[derive(Debug, Clone)]
pub struct ArithVector {
    /// Unique identifier for this vector.
    pub id: &'static str,
    /// Operation under test.
    pub op: ArithOp,
    /// Left operand.
    pub a: i32,
    /// Right operand.
    pub b: i32,
    /// Expected result or error kind.
    pub expected: Result<i32, ErrorKind>,
}

/// Boundary vectors for checked `i32` arithmetic.
pub fn arith_vectors() -> Vec<ArithVector> {
    use ArithOp::{Add, Div, Mul, Sub};
    let v = |id, op, a, b, expected| ArithVector { id, op, a, b, expected };
    vec![
        v("add_small", Add, 2, 3, Ok(5)),
        v("add_max_plus_one", Add, i32::MAX, 1, Err(ErrorKind::Overflow)),
        v("add_min_minus_one", Add, i32::MIN, -1, Err(ErrorKind::Overflow)),
        v("add_max_plus_zero", Add, i32::MAX, 0, Ok(i32::MAX)),
        v("sub_min_minus_one", Sub, i32::MIN, 1, Err(ErrorKind::Overflow)),
        v("sub_zero_minus_min", Sub, 0, i32::MIN, Err(ErrorKind::Overflow)),
        v("sub_to_min", Sub, -1, i32::MAX, Ok(i32::MIN)),
        v("mul_min_times_neg_one", Mul, i32::MIN, -1, Err(ErrorKind::Overflow)),
        v("mul_large", Mul, 65_536, 65_536, Err(ErrorKind::Overflow)),
        v("mul_fits", Mul, 46_340, 46_340, Ok(2_147_395_600)),
        v("div_truncates", Div, -7, 2, Ok(-3)),
        v("div_by_zero", Div, 1, 0, Err(ErrorKind::InvalidParam)),
        v("div_min_by_neg_one", Div, i32::MIN, -1, Err(ErrorKind::Overflow)),
    ]
}

/// Runs `vector` through `safeops_core::arith`.
pub fn run_arith_vector(vector: &ArithVector) -> Result<i32, ErrorKind> {
    use safeops_core::arith;
    let result = match vector.op {
        ArithOp::Add => arith::add(vector.a, vector.b),
        ArithOp::Sub => arith::sub(vector.a, vector.b),
        ArithOp::Mul => arith::mul(vector.a, vector.b),
        ArithOp::Div => arith::div(vector.a, vector.b),
    };
    result.map_err(|e| e.kind())
}

/// A step of a string scenario.
#[derive(Debug, Clone)]
pub enum StringStep {
    /// Copy the text into the buffer.
    Copy(&'static [u8]),
    /// Append the text.
    Concat(&'static [u8]),
    /// Find the text within the current length; expect this position.
    Find(&'static [u8], usize),
    /// Replace every occurrence of the first text with the second.
    Replace(&'static [u8], &'static [u8]),
}

/// A string scenario: a buffer capacity, steps and the final contents.
#[derive(Debug, Clone)]
pub struct StringScenario {
    /// Unique identifier for this scenario.
    pub id: &'static str,
    /// Buffer capacity, terminator included.
    pub capacity: usize,
    /// Steps applied in order; each must succeed.
    pub steps: Vec<StringStep>,
    /// Expected string after the last step.
    pub expected: &'static [u8],
}

/// String scenarios that must succeed end to end.
pub fn string_scenarios() -> Vec<StringScenario> {
    use StringStep::{Concat, Copy, Find, Replace};
    vec![
        StringScenario {
            id: "greeting",
            capacity: 50,
            steps: vec![
                Copy(b"Hello, World!"),
                Concat(b" How are you?"),
                Find(b"World", 7),
                Replace(b"World", b"Everyone"),
            ],
            expected: b"Hello, Everyone! How are you?",
        },
        StringScenario {
            id: "exact_fit",
            capacity: 6,
            steps: vec![Copy(b"abc"), Concat(b"de")],
            expected: b"abcde",
        },
        StringScenario {
            id: "shrinking_replace",
            capacity: 16,
            steps: vec![
                Copy(b"aaXaaXaa"),
                Replace(b"aa", b"b"),
                Find(b"Q", 5),
            ],
            expected: b"bXbXb",
        },
    ]
}

/// Runs `scenario` through `safeops_core::string` and returns the final
/// contents, or the first failing step's index and error kind.
pub fn run_string_scenario(scenario: &StringScenario) -> Result<Vec<u8>, (usize, ErrorKind)> {
    use safeops_core::string;
    let mut buf = vec![0u8; scenario.capacity];
    for (index, step) in scenario.steps.iter().enumerate() {
        let fail = |e: safeops_core::SafeError| (index, e.kind());
        match *step {
            StringStep::Copy(text) => {
                string::copy(&mut buf, text).map_err(fail)?;
            }
            StringStep::Concat(text) => {
                string::concat(&mut buf, text).map_err(fail)?;
            }
            StringStep::Find(needle, expected) => {
                let len = string::length(&buf, scenario.capacity).map_err(fail)?;
                let pos = string::find(&buf, len, needle).map_err(fail)?;
                if pos != expected {
                    return Err((index, ErrorKind::Unknown));
                }
            }
            StringStep::Replace(old, new) => {
                string::replace(&mut buf, old, new).map_err(fail)?;
            }
        }
    }
    let len = string::length(&buf, scenario.capacity).map_err(|e| (scenario.steps.len(), e.kind()))?;
    buf.truncate(len);
    Ok(buf)
}
