//! Scan directions and reciprocal lookup

use std::ops::Neg;

use serde::{Deserialize, Serialize};

use crate::error::{SignatureError, SignatureResult};

/// Direction vector in 3D space
///
/// Not required to be unit length; reciprocity compares raw dot products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// X component (left/right, positive = right)
    pub x: f32,
    /// Y component (front/back, positive = front)
    pub y: f32,
    /// Z component (up/down, positive = up)
    pub z: f32,
}

impl Direction {
    /// Create new direction
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Vector length
    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalize to unit vector
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag < 1e-10 {
            return Self::new(0.0, 1.0, 0.0); // Default forward
        }
        Self::new(self.x / mag, self.y / mag, self.z / mag)
    }
}

impl Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Index of the most opposing direction for each direction
///
/// For each `j`, picks the `i != j` with the lowest dot product. Ties go to the
/// lowest index.
pub fn reciprocal_indices(directions: &[Direction]) -> SignatureResult<Vec<usize>> {
    if directions.len() < 2 {
        return Err(SignatureError::TooFewDirections(directions.len()));
    }

    let indices: Vec<usize> = directions
        .iter()
        .enumerate()
        .map(|(j, dir)| {
            let mut best_index = if j == 0 { 1 } else { 0 };
            let mut best_dot = f32::INFINITY;
            for (i, other) in directions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let dot = other.dot(dir);
                if dot < best_dot {
                    best_dot = dot;
                    best_index = i;
                }
            }
            best_index
        })
        .collect();
    Ok(indices)
}

/// Most opposing direction for each direction, by value
///
/// Several directions may share the same reciprocal.
pub fn reciprocals(directions: &[Direction]) -> SignatureResult<Vec<Direction>> {
    Ok(reciprocal_indices(directions)?
        .into_iter()
        .map(|i| directions[i])
        .collect())
}
