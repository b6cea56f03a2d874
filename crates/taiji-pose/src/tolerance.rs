//! Tolerance bands - the reference posture
//!
//! Each band is the acceptable angle range for one joint. Bands are checked
//! when the table is built so a bad reference never reaches the frame loop.

use std::collections::HashSet;

use taiji_core::{TaijiError, TaijiResult};

/// Which side of the band an angle fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Within the band
    Ok,
    /// Above `max`; needs more extension
    TooFlexed,
    /// Below `min`; needs more flexion
    TooExtended,
}

/// Acceptable range for one joint, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceBand {
    pub min: f64,
    pub ideal: f64,
    pub max: f64,
}

impl ToleranceBand {
    pub const fn new(min: f64, ideal: f64, max: f64) -> Self {
        Self { min, ideal, max }
    }

    /// Band centred on `ideal`, `spread` degrees either side
    pub fn around(ideal: f64, spread: f64) -> Self {
        Self::new(ideal - spread, ideal, ideal + spread)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.ideal.is_finite()
            && self.max.is_finite()
            && self.min <= self.ideal
            && self.ideal <= self.max
    }

    /// Inclusive on both ends
    pub fn contains(&self, angle: f64) -> bool {
        self.min <= angle && angle <= self.max
    }

    pub fn classify(&self, angle: f64) -> Direction {
        if angle < self.min {
            Direction::TooExtended
        } else if angle > self.max {
            Direction::TooFlexed
        } else {
            Direction::Ok
        }
    }

    /// Signed distance from the ideal angle
    pub fn deviation(&self, angle: f64) -> f64 {
        angle - self.ideal
    }
}

/// Validated joint name -> band table
#[derive(Debug, Clone, Default)]
pub struct ToleranceTable {
    bands: Vec<(String, ToleranceBand)>,
}

impl ToleranceTable {
    pub fn new<N, I>(bands: I) -> TaijiResult<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, ToleranceBand)>,
    {
        let bands: Vec<(String, ToleranceBand)> =
            bands.into_iter().map(|(n, b)| (n.into(), b)).collect();

        let mut seen = HashSet::new();
        for (joint, band) in &bands {
            if !band.is_valid() {
                return Err(TaijiError::InvalidBand {
                    joint: joint.clone(),
                    min: band.min,
                    ideal: band.ideal,
                    max: band.max,
                });
            }
            if !seen.insert(joint.as_str()) {
                return Err(TaijiError::DuplicateBand(joint.clone()));
            }
        }

        Ok(Self { bands })
    }

    /// 24-form Tai Chi, fundamentals stage. Hips are measured but not scored.
    pub fn tai_chi_fundamentals() -> Self {
        const ELBOW: ToleranceBand = ToleranceBand::new(110.0, 125.0, 140.0);
        const KNEE: ToleranceBand = ToleranceBand::new(150.0, 165.0, 180.0);
        const SHOULDER: ToleranceBand = ToleranceBand::new(80.0, 100.0, 120.0);

        Self {
            bands: vec![
                ("left_elbow".into(), ELBOW),
                ("right_elbow".into(), ELBOW),
                ("left_knee".into(), KNEE),
                ("right_knee".into(), KNEE),
                ("left_shoulder".into(), SHOULDER),
                ("right_shoulder".into(), SHOULDER),
            ],
        }
    }

    pub fn get(&self, joint: &str) -> Option<&ToleranceBand> {
        self.bands.iter().find(|(n, _)| n == joint).map(|(_, b)| b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToleranceBand)> {
        self.bands.iter().map(|(n, b)| (n.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_classification() {
        let band = ToleranceBand::new(110.0, 125.0, 140.0);

        assert_eq!(band.classify(110.0), Direction::Ok);
        assert_eq!(band.classify(140.0), Direction::Ok);
        assert_eq!(band.classify(109.9), Direction::TooExtended);
        assert_eq!(band.classify(140.1), Direction::TooFlexed);
        assert!(band.contains(125.0));
        assert!(!band.contains(141.0));
        assert_eq!(band.deviation(120.0), -5.0);
    }

    #[test]
    fn test_band_validity() {
        assert!(ToleranceBand::new(10.0, 10.0, 10.0).is_valid());
        assert!(ToleranceBand::around(90.0, 15.0).is_valid());
        assert!(!ToleranceBand::new(140.0, 125.0, 110.0).is_valid());
        assert!(!ToleranceBand::new(110.0, 150.0, 140.0).is_valid());
        assert!(!ToleranceBand::new(f64::NAN, 125.0, 140.0).is_valid());
    }

    #[test]
    fn test_table_rejects_inverted_band() {
        let err = ToleranceTable::new([("left_elbow", ToleranceBand::new(140.0, 125.0, 110.0))])
            .unwrap_err();
        assert!(matches!(err, TaijiError::InvalidBand { .. }));
    }

    #[test]
    fn test_table_rejects_duplicates() {
        let band = ToleranceBand::new(80.0, 100.0, 120.0);
        let result = ToleranceTable::new([("left_shoulder", band), ("left_shoulder", band)]);
        assert!(matches!(result, Err(TaijiError::DuplicateBand(_))));
    }

    #[test]
    fn test_reference_posture() {
        let table = ToleranceTable::tai_chi_fundamentals();
        assert_eq!(table.len(), 6);
        assert!(table.iter().all(|(_, b)| b.is_valid()));
        assert_eq!(table.get("left_knee").map(|b| b.ideal), Some(165.0));
        assert!(table.get("left_hip").is_none());

        let rebuilt = ToleranceTable::new(table.iter().map(|(n, b)| (n.to_string(), *b)));
        assert!(rebuilt.is_ok());
    }
}
