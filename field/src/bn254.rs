//! BN254 scalar field. r = 0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001
//!
//! Elements are kept in Montgomery form as four little-endian 64-bit limbs.
//! This is the "internal" representation the evaluation engine works with;
//! [`Fr::to_canonical_limbs`] leaves Montgomery form for the wire.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use core::iter::{Product, Sum};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_bigint::BigUint;
use p3_field::integers::QuotientMap;
use p3_field::{Field, Packable, PrimeCharacteristicRing, PrimeField, RawDataSerializable};
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Element of the BN254 scalar field, stored as `value * R mod r`.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Fr {
    limbs: [u64; 4],
}

const MODULUS: [u64; 4] = [
    0x43e1f593f0000001,
    0x2833e84879b97091,
    0xb85045b68181585d,
    0x30644e72e131a029,
];

// R = 2^256 mod r
const R: [u64; 4] = [
    0xac96341c4ffffffb,
    0x36fc76959f60cd29,
    0x666ea36f7879462e,
    0x0e0a77c19a07df2f,
];

// R^2 = 2^512 mod r
const R2: [u64; 4] = [
    0x1bb8e645ae216da7,
    0x53fe3ab1e35c59e3,
    0x8c49833d53bb8085,
    0x0216d0b17f4e44a5,
];

// -r^{-1} mod 2^64
const INV: u64 = 0xc2e1f593efffffff;

// The top limb never uses its two high bits.
const TOP_LIMB_MASK: u64 = 0x3fff_ffff_ffff_ffff;

/// Little-endian 64-bit limbs.
pub type Limbs = [u64; 4];

impl Fr {
    pub const ZERO: Self = Fr { limbs: [0; 4] };

    pub const ONE: Self = Fr { limbs: R };

    #[inline]
    pub fn from_canonical_u64(val: u64) -> Self {
        Self::from_canonical_limbs([val, 0, 0, 0])
    }

    /// Builds an element from little-endian limbs that are already below `r`.
    ///
    /// Returns `None` for non-canonical limbs.
    pub fn from_canonical_limbs_checked(limbs: Limbs) -> Option<Self> {
        is_canonical(limbs).then(|| Self::from_canonical_limbs(limbs))
    }

    /// Leaves Montgomery form.
    #[inline]
    pub fn to_canonical_limbs(&self) -> Limbs {
        montgomery_mul(&self.limbs, &[1, 0, 0, 0])
    }

    #[inline]
    fn from_canonical_limbs(limbs: Limbs) -> Self {
        Fr {
            limbs: montgomery_mul(&limbs, &R2),
        }
    }

    fn canonical_le_bytes(&self) -> Vec<u8> {
        self.to_canonical_limbs()
            .into_iter()
            .flat_map(u64::to_le_bytes)
            .collect()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        limbs_are_zero(self.limbs)
    }

    /// Multiplicative inverse via `a^(r-2)`. Zero maps to zero.
    pub fn inverse(&self) -> Self {
        self.pow_vartime(sub_mod(MODULUS, [2, 0, 0, 0]))
    }

    /// Left-to-right square and multiply.
    fn pow_vartime(&self, exp: Limbs) -> Self {
        let mut acc = Self::ONE;
        for limb in exp.into_iter().rev() {
            for bit in (0..64).rev() {
                acc = acc.square();
                if (limb >> bit) & 1 == 1 {
                    acc *= *self;
                }
            }
        }
        acc
    }

    fn from_u128(int: u128) -> Self {
        Self::from_canonical_limbs([int as u64, (int >> 64) as u64, 0, 0])
    }

    fn from_i128(int: i128) -> Self {
        let magnitude = Self::from_u128(int.unsigned_abs());
        if int < 0 { -magnitude } else { magnitude }
    }
}

fn limbs_to_biguint(limbs: Limbs) -> BigUint {
    BigUint::new(
        limbs
            .into_iter()
            .flat_map(|limb| [limb as u32, (limb >> 32) as u32])
            .collect(),
    )
}

/// Low word of `a + b + carry` and the carry out.
#[inline(always)]
const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let wide = a as u128 + b as u128 + carry as u128;
    (wide as u64, (wide >> 64) as u64)
}

/// Low word of `a - b - borrow` and the borrow out (0 or 1).
#[inline(always)]
const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let wide = (a as u128).wrapping_sub(b as u128 + borrow as u128);
    (wide as u64, (wide >> 127) as u64)
}

/// Low word of `acc + a * b + carry` and the high word.
#[inline(always)]
const fn mac(acc: u64, a: u64, b: u64, carry: u64) -> (u64, u64) {
    let wide = acc as u128 + (a as u128) * (b as u128) + carry as u128;
    (wide as u64, (wide >> 64) as u64)
}

const fn add_limbs(a: Limbs, b: Limbs) -> (Limbs, u64) {
    let mut out = [0; 4];
    let mut carry = 0;
    let mut i = 0;
    while i < 4 {
        let (word, next) = adc(a[i], b[i], carry);
        out[i] = word;
        carry = next;
        i += 1;
    }
    (out, carry)
}

const fn sub_limbs(a: Limbs, b: Limbs) -> (Limbs, u64) {
    let mut out = [0; 4];
    let mut borrow = 0;
    let mut i = 0;
    while i < 4 {
        let (word, next) = sbb(a[i], b[i], borrow);
        out[i] = word;
        borrow = next;
        i += 1;
    }
    (out, borrow)
}

const fn limbs_are_zero(a: Limbs) -> bool {
    a[0] | a[1] | a[2] | a[3] == 0
}

const fn is_canonical(limbs: Limbs) -> bool {
    sub_limbs(limbs, MODULUS).1 == 1
}

const fn add_mod(a: Limbs, b: Limbs) -> Limbs {
    let (sum, carry) = add_limbs(a, b);
    let (reduced, borrow) = sub_limbs(sum, MODULUS);
    if carry == 1 || borrow == 0 { reduced } else { sum }
}

const fn sub_mod(a: Limbs, b: Limbs) -> Limbs {
    let (diff, borrow) = sub_limbs(a, b);
    if borrow == 1 { add_limbs(diff, MODULUS).0 } else { diff }
}

const fn neg_mod(a: Limbs) -> Limbs {
    if limbs_are_zero(a) { a } else { sub_mod(MODULUS, a) }
}

/// `a * b * R^{-1} mod r` with interleaved (CIOS) reduction.
///
/// `r < 2^254`, so the running sum never needs more than one spare word and
/// the result needs at most one final subtraction.
fn montgomery_mul(a: &Limbs, b: &Limbs) -> Limbs {
    let mut t = [0u64; 6];
    for &word in a {
        let mut carry = 0;
        for j in 0..4 {
            (t[j], carry) = mac(t[j], word, b[j], carry);
        }
        (t[4], t[5]) = adc(t[4], carry, 0);

        let m = t[0].wrapping_mul(INV);
        let (_, mut carry) = mac(t[0], m, MODULUS[0], 0);
        for j in 1..4 {
            (t[j - 1], carry) = mac(t[j], m, MODULUS[j], carry);
        }
        let (top, overflow) = adc(t[4], carry, 0);
        t[3] = top;
        t[4] = t[5] + overflow;
    }

    let result = [t[0], t[1], t[2], t[3]];
    if is_canonical(result) {
        result
    } else {
        sub_limbs(result, MODULUS).0
    }
}

impl PrimeCharacteristicRing for Fr {
    type PrimeSubfield = Self;

    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;
    const TWO: Self = Fr {
        limbs: add_mod(R, R),
    };
    const NEG_ONE: Self = Fr {
        limbs: sub_mod(MODULUS, R),
    };

    #[inline]
    fn from_prime_subfield(elem: Self::PrimeSubfield) -> Self {
        elem
    }

    fn halve(&self) -> Self {
        // (x + r) / 2 for odd x; r is odd and below 2^255 so the sum fits.
        let even = if self.limbs[0] & 1 == 1 {
            add_limbs(self.limbs, MODULUS).0
        } else {
            self.limbs
        };
        let mut limbs = [0; 4];
        for i in 0..4 {
            let high = even.get(i + 1).map_or(0, |next| next << 63);
            limbs[i] = (even[i] >> 1) | high;
        }
        Fr { limbs }
    }
}

impl Packable for Fr {}

impl RawDataSerializable for Fr {
    const NUM_BYTES: usize = 32;

    fn into_bytes(self) -> impl IntoIterator<Item = u8> {
        self.canonical_le_bytes()
    }
}

impl Distribution<Fr> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fr {
        loop {
            let mut limbs: [u64; 4] = rng.random();
            limbs[3] &= TOP_LIMB_MASK;
            if let Some(elem) = Fr::from_canonical_limbs_checked(limbs) {
                return elem;
            }
        }
    }
}

impl Field for Fr {
    type Packing = Self;

    // 7 generates the multiplicative group; Montgomery form of 7.
    const GENERATOR: Self = Fr {
        limbs: [
            0x3057819e4fffffdb,
            0x307f6d866832bb01,
            0x5c65ec9f484e3a89,
            0x0180a96573d3d9f8,
        ],
    };

    fn try_inverse(&self) -> Option<Self> {
        (!self.is_zero()).then(|| self.inverse())
    }

    fn order() -> BigUint {
        limbs_to_biguint(MODULUS)
    }
}

impl PrimeField for Fr {
    fn as_canonical_biguint(&self) -> BigUint {
        limbs_to_biguint(self.to_canonical_limbs())
    }
}

macro_rules! quotient_map_unsigned {
    ($($int:ty),*) => {$(
        impl QuotientMap<$int> for Fr {
            fn from_int(int: $int) -> Self {
                Self::from_u128(int as u128)
            }

            fn from_canonical_checked(int: $int) -> Option<Self> {
                Some(Self::from_u128(int as u128))
            }

            unsafe fn from_canonical_unchecked(int: $int) -> Self {
                Self::from_u128(int as u128)
            }
        }
    )*};
}

macro_rules! quotient_map_signed {
    ($($int:ty),*) => {$(
        impl QuotientMap<$int> for Fr {
            fn from_int(int: $int) -> Self {
                Self::from_i128(int as i128)
            }

            fn from_canonical_checked(int: $int) -> Option<Self> {
                Some(Self::from_i128(int as i128))
            }

            unsafe fn from_canonical_unchecked(int: $int) -> Self {
                Self::from_i128(int as i128)
            }
        }
    )*};
}

quotient_map_unsigned!(u8, u16, u32, u64, u128);
quotient_map_signed!(i8, i16, i32, i64, i128);

macro_rules! binary_op {
    ($($trait:ident::$method:ident($lhs:ident, $rhs:ident) => $body:expr;)*) => {$(
        impl $trait for Fr {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                let ($lhs, $rhs) = (self, rhs);
                $body
            }
        }
    )*};
}

binary_op! {
    Add::add(a, b) => Fr { limbs: add_mod(a.limbs, b.limbs) };
    Sub::sub(a, b) => Fr { limbs: sub_mod(a.limbs, b.limbs) };
    Mul::mul(a, b) => Fr { limbs: montgomery_mul(&a.limbs, &b.limbs) };
    Div::div(a, b) => a * b.inverse();
}

macro_rules! assign_op {
    ($($trait:ident::$method:ident => $op:tt),*) => {$(
        impl $trait for Fr {
            #[inline]
            fn $method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    )*};
}

assign_op!(
    AddAssign::add_assign => +,
    SubAssign::sub_assign => -,
    MulAssign::mul_assign => *,
    DivAssign::div_assign => /
);

impl Neg for Fr {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Fr {
            limbs: neg_mod(self.limbs),
        }
    }
}

impl Sum for Fr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.reduce(Add::add).unwrap_or(Self::ZERO)
    }
}

impl Product for Fr {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.reduce(Mul::mul).unwrap_or(Self::ONE)
    }
}

/// Decimal, like circom prints signals.
impl Display for Fr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_canonical_biguint())
    }
}

impl Debug for Fr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Fr({})", self)
    }
}

impl Hash for Fr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.limbs.hash(state);
    }
}
