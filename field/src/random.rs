use rand::distr::{Distribution, StandardUniform};
use rand::Rng;

use crate::{BabyBear, Fr, KoalaBear};

/// Helper trait for sampling uniformly random field elements.
pub trait RandomField: Sized {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

macro_rules! impl_random_field {
    ($($field:ty),*) => {$(
        impl RandomField for $field {
            #[inline]
            fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                StandardUniform.sample(rng)
            }
        }
    )*};
}

impl_random_field!(Fr, KoalaBear, BabyBear);
