//!
//! The general-purpose register file and the CSR file.
//!
//! Registers hold raw `u32`s. Reading or writing them through [FromRegister] and [IntoRegister]
//! chooses how the bits are interpreted, so `set::<i8>` sign-extends a byte and `set::<u16>`
//! zero-extends a half.
//!

/// If a type implements IntoRegister, its value can be stored in a 32-bit register
pub trait IntoRegister {
    fn into_register(self) -> u32;
}

macro_rules! impl_into_register {
    ($type:ident => $($via:ident)*) => {
        impl IntoRegister for $type {
            fn into_register(self) -> u32 {
                self $(as $via)* as u32
            }
        }
    };
}

impl_into_register!(u32 =>);
impl_into_register!(i32 =>);
impl_into_register!(u16 =>);
impl_into_register!(i16 => i32);
impl_into_register!(u8 =>);
impl_into_register!(i8 => i32);
impl_into_register!(bool => u8);

pub trait FromRegister {
    fn from_register(x: u32) -> Self;
}

macro_rules! impl_from_register {
    ($($type:ident)*) => {
        $(
            impl FromRegister for $type {
                fn from_register(x: u32) -> Self {
                    x as $type
                }
            }
        )*
    };
}

impl_from_register!(u32 i32 u16 i16 u8 i8);

pub const REGISTER_COUNT: usize = 32;
pub const CSR_COUNT: usize = 4096;

/// 32 registers, with `x0` hardwired to zero
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers([u32; REGISTER_COUNT]);

impl Registers {
    pub fn get<T: FromRegister>(&self, i: u8) -> T {
        T::from_register(self.0[i as usize & (REGISTER_COUNT - 1)])
    }

    pub fn set<T: IntoRegister>(&mut self, i: u8, x: T) {
        if i != 0 {
            self.0[i as usize & (REGISTER_COUNT - 1)] = x.into_register();
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// Control and status registers. None of them have side effects: a read returns whatever was
/// written last.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrFile(Box<[u32]>);

impl Default for CsrFile {
    fn default() -> Self {
        Self(vec![0; CSR_COUNT].into_boxed_slice())
    }
}

impl std::fmt::Debug for CsrFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // only the ones in use
        f.debug_map()
            .entries(self.0.iter().enumerate().filter(|(_, &x)| x != 0))
            .finish()
    }
}

impl CsrFile {
    pub fn get(&self, csr: u16) -> u32 {
        self.0[csr as usize % CSR_COUNT]
    }

    pub fn set(&mut self, csr: u16, x: u32) {
        self.0[csr as usize % CSR_COUNT] = x;
    }

    /// Replaces the value of `csr` with `f(old)` and returns `old`
    pub fn update(&mut self, csr: u16, f: impl FnOnce(u32) -> u32) -> u32 {
        let old = self.get(csr);
        self.set(csr, f(old));
        old
    }
}
