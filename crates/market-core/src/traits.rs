use rand::RngCore;

use crate::{GameError, MultiInstrumentPriceSet};

/// Source of the monthly price data a game session is played on.
///
/// Synthetic and historical suppliers both implement this; the rest of the
/// core only relies on the `PricePoint` contract of what comes back.
pub trait PriceSupplier {
    /// Produce `months` aligned monthly points for every symbol the supplier
    /// covers.
    fn supply(
        &self,
        months: usize,
        rng: &mut dyn RngCore,
    ) -> Result<MultiInstrumentPriceSet, GameError>;
}
