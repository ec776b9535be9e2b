use crate::matrix::Matrix;
use crate::scanner::{Cursor, REGISTER_NAME_WIDTH};

/// Handle to one of the six named matrix slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl RegisterId {
    pub const ALL: [RegisterId; 6] = [
        RegisterId::A,
        RegisterId::B,
        RegisterId::C,
        RegisterId::D,
        RegisterId::E,
        RegisterId::F,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RegisterId::A => "MAT_A",
            RegisterId::B => "MAT_B",
            RegisterId::C => "MAT_C",
            RegisterId::D => "MAT_D",
            RegisterId::E => "MAT_E",
            RegisterId::F => "MAT_F",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Match the fixed-width window under the cursor against the register names.
///
/// Matching is purely positional: only the next five bytes are compared, so
/// `MAT_Ax` resolves to `MAT_A` and leaves `x` for the caller to deal with.
pub fn resolve(cursor: &Cursor<'_>) -> Option<RegisterId> {
    let window = cursor.rest().get(..REGISTER_NAME_WIDTH)?;
    RegisterId::ALL
        .into_iter()
        .find(|id| id.name().as_bytes() == window)
}

/// The interpreter's mutable state: six matrices, all zero at start.
///
/// Slots are only ever replaced whole, after a command has fully validated.
#[derive(Debug, Clone, Default)]
pub struct Registers {
    slots: [Matrix; 6],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RegisterId) -> &Matrix {
        &self.slots[id.index()]
    }

    pub fn set(&mut self, id: RegisterId, value: Matrix) {
        tracing::trace!(register = id.name(), "register written");
        self.slots[id.index()] = value;
    }
}
