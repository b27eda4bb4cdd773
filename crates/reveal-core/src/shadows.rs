//! # Shadow Metrics
//!
//! Material elevation shadows are composited from three layers. Each layer
//! has a fixed opacity and a design table mapping elevation (0..=24) to
//! `(offset_y, blur, spread)`.

use crate::errors::{Result, RevealError};
use crate::types::MAX_ELEVATION;
use serde::{Deserialize, Serialize};

/// One of the three layers of a Material shadow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowKind {
    Umbra,
    Penumbra,
    Ambient,
}

impl ShadowKind {
    /// All kinds, in the order their layers are committed.
    pub const ALL: [ShadowKind; 3] = [
        ShadowKind::Penumbra,
        ShadowKind::Umbra,
        ShadowKind::Ambient,
    ];

    pub fn opacity(&self) -> f32 {
        match self {
            ShadowKind::Umbra => 0.20,
            ShadowKind::Penumbra => 0.14,
            ShadowKind::Ambient => 0.12,
        }
    }

    fn table(&self) -> &'static [(i8, i8, i8); 25] {
        match self {
            ShadowKind::Umbra => &UMBRA,
            ShadowKind::Penumbra => &PENUMBRA,
            ShadowKind::Ambient => &AMBIENT,
        }
    }
}

/// Resolved shadow parameters for one layer at one elevation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ShadowProperties {
    pub offset_y: f64,
    pub blur: f64,
    pub spread: f64,
    pub opacity: f32,
}

/// Looks up the tabulated metrics for `kind` at `elevation`.
pub fn lookup(kind: ShadowKind, elevation: u8) -> Result<ShadowProperties> {
    if elevation > MAX_ELEVATION {
        return Err(RevealError::ElevationOutOfRange(elevation));
    }
    let (offset_y, blur, spread) = kind.table()[elevation as usize];
    Ok(ShadowProperties {
        offset_y: offset_y as f64,
        blur: blur as f64,
        spread: spread as f64,
        opacity: kind.opacity(),
    })
}

/// A value per shadow kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowSet<T> {
    pub umbra: T,
    pub penumbra: T,
    pub ambient: T,
}

impl<T> ShadowSet<T> {
    /// Builds a set by evaluating `f` for every kind.
    pub fn from_fn(mut f: impl FnMut(ShadowKind) -> T) -> Self {
        Self {
            umbra: f(ShadowKind::Umbra),
            penumbra: f(ShadowKind::Penumbra),
            ambient: f(ShadowKind::Ambient),
        }
    }

    /// Fallible variant of [`ShadowSet::from_fn`].
    pub fn try_from_fn<E>(
        mut f: impl FnMut(ShadowKind) -> std::result::Result<T, E>,
    ) -> std::result::Result<Self, E> {
        Ok(Self {
            umbra: f(ShadowKind::Umbra)?,
            penumbra: f(ShadowKind::Penumbra)?,
            ambient: f(ShadowKind::Ambient)?,
        })
    }

    pub fn get(&self, kind: ShadowKind) -> &T {
        match kind {
            ShadowKind::Umbra => &self.umbra,
            ShadowKind::Penumbra => &self.penumbra,
            ShadowKind::Ambient => &self.ambient,
        }
    }

    pub fn get_mut(&mut self, kind: ShadowKind) -> &mut T {
        match kind {
            ShadowKind::Umbra => &mut self.umbra,
            ShadowKind::Penumbra => &mut self.penumbra,
            ShadowKind::Ambient => &mut self.ambient,
        }
    }

    /// Iterates in [`ShadowKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ShadowKind, &T)> {
        ShadowKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(ShadowKind, &T) -> U) -> ShadowSet<U> {
        ShadowSet::from_fn(|kind| f(kind, self.get(kind)))
    }
}

/// Resolves all three layers at `elevation`.
pub fn lookup_all(elevation: u8) -> Result<ShadowSet<ShadowProperties>> {
    ShadowSet::try_from_fn(|kind| lookup(kind, elevation))
}

// (offset_y, blur, spread) per elevation.

const UMBRA: [(i8, i8, i8); 25] = [
    (0, 0, 0),
    (2, 1, -1),
    (3, 1, -2),
    (3, 3, -2),
    (2, 4, -1),
    (3, 5, -1),
    (3, 5, -1),
    (4, 5, -2),
    (5, 5, -3),
    (5, 6, -3),
    (6, 6, -3),
    (6, 7, -4),
    (7, 8, -4),
    (7, 8, -4),
    (7, 9, -4),
    (8, 9, -5),
    (8, 10, -5),
    (8, 11, -5),
    (9, 11, -5),
    (9, 12, -6),
    (10, 13, -6),
    (10, 13, -6),
    (10, 14, -6),
    (11, 14, -7),
    (11, 15, -7),
];

const PENUMBRA: [(i8, i8, i8); 25] = [
    (0, 0, 0),
    (1, 1, 0),
    (2, 2, 0),
    (3, 4, 0),
    (4, 5, 0),
    (5, 8, 0),
    (6, 10, 0),
    (7, 10, 1),
    (8, 10, 1),
    (9, 12, 1),
    (10, 14, 1),
    (11, 15, 1),
    (12, 17, 2),
    (13, 19, 2),
    (14, 21, 2),
    (15, 22, 2),
    (16, 24, 2),
    (17, 26, 2),
    (18, 28, 2),
    (19, 29, 2),
    (20, 31, 3),
    (21, 33, 3),
    (22, 35, 3),
    (23, 36, 3),
    (24, 38, 3),
];

const AMBIENT: [(i8, i8, i8); 25] = [
    (0, 0, 0),
    (1, 3, 0),
    (1, 5, 0),
    (1, 8, 0),
    (1, 10, 0),
    (1, 14, 0),
    (1, 18, 0),
    (2, 16, 1),
    (3, 14, 1),
    (3, 16, 1),
    (4, 18, 1),
    (4, 20, 1),
    (5, 22, 2),
    (5, 24, 2),
    (5, 26, 2),
    (6, 28, 2),
    (6, 30, 2),
    (6, 32, 2),
    (7, 34, 2),
    (7, 36, 2),
    (8, 38, 3),
    (8, 40, 3),
    (8, 42, 3),
    (9, 44, 3),
    (9, 46, 3),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(props: ShadowProperties) -> (f64, f64, f64) {
        (props.offset_y, props.blur, props.spread)
    }

    #[test]
    fn test_umbra_at_six() {
        let props = lookup(ShadowKind::Umbra, 6).unwrap();
        assert_eq!(triple(props), (3.0, 5.0, -1.0));
        assert_eq!(props.opacity, 0.20);
    }

    #[test]
    fn test_table_endpoints() {
        for kind in ShadowKind::ALL {
            assert_eq!(triple(lookup(kind, 0).unwrap()), (0.0, 0.0, 0.0));
        }
        assert_eq!(triple(lookup(ShadowKind::Umbra, 24).unwrap()), (11.0, 15.0, -7.0));
        assert_eq!(triple(lookup(ShadowKind::Penumbra, 24).unwrap()), (24.0, 38.0, 3.0));
        assert_eq!(triple(lookup(ShadowKind::Ambient, 24).unwrap()), (9.0, 46.0, 3.0));
    }

    #[test]
    fn test_spot_values() {
        assert_eq!(triple(lookup(ShadowKind::Penumbra, 6).unwrap()), (6.0, 10.0, 0.0));
        assert_eq!(triple(lookup(ShadowKind::Ambient, 6).unwrap()), (1.0, 18.0, 0.0));
        assert_eq!(triple(lookup(ShadowKind::Umbra, 11).unwrap()), (6.0, 7.0, -4.0));
        assert_eq!(triple(lookup(ShadowKind::Ambient, 8).unwrap()), (3.0, 14.0, 1.0));
        assert_eq!(triple(lookup(ShadowKind::Penumbra, 19).unwrap()), (19.0, 29.0, 2.0));
    }

    #[test]
    fn test_opacity_is_fixed_per_kind() {
        for elevation in 0..=MAX_ELEVATION {
            assert_eq!(lookup(ShadowKind::Umbra, elevation).unwrap().opacity, 0.20);
            assert_eq!(lookup(ShadowKind::Penumbra, elevation).unwrap().opacity, 0.14);
            assert_eq!(lookup(ShadowKind::Ambient, elevation).unwrap().opacity, 0.12);
        }
    }

    #[test]
    fn test_out_of_range_elevation() {
        assert_eq!(
            lookup(ShadowKind::Ambient, 25),
            Err(RevealError::ElevationOutOfRange(25))
        );
        assert!(lookup_all(200).is_err());
    }

    #[test]
    fn test_shadow_set_iterates_in_commit_order() {
        let set = ShadowSet::from_fn(|kind| kind.opacity());
        let kinds: Vec<ShadowKind> = set.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, ShadowKind::ALL.to_vec());
        assert_eq!(*set.get(ShadowKind::Penumbra), 0.14);
    }
}
