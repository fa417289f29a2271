//! Output orientation transforms.
//!
//! A client may ask for the screen to be rotated and/or mirrored. The eight
//! possible orientations form the symmetry group of the square: composing two
//! of them gives another, and each has an inverse among them.
//!
//! Rotations are counter-clockwise. Flipped variants mirror around the
//! vertical axis first and then rotate, matching the numbering of Wayland's
//! `wl_output.transform`.
//!
//! Points are mapped in continuous coordinates: the pixel at (x, y) is the unit
//! square with corners (x, y) and (x + 1, y + 1), and the whole buffer is the
//! rectangle with corners (0, 0) and (width, height). The transform matrix maps
//! that rectangle onto (0, 0)..(width', height') of the transformed buffer.

use std::cmp::min;

use super::region::{Rect, Region};

/// One of the eight rotation/mirror combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Transform {
    /// No transformation.
    #[default]
    Normal = 0,
    /// Rotate 90 degrees counter-clockwise.
    Rotate90 = 1,
    /// Rotate 180 degrees.
    Rotate180 = 2,
    /// Rotate 270 degrees counter-clockwise.
    Rotate270 = 3,
    /// Mirror left-right.
    Flipped = 4,
    /// Mirror, then rotate 90 degrees (transpose).
    Flipped90 = 5,
    /// Mirror, then rotate 180 degrees (mirror top-bottom).
    Flipped180 = 6,
    /// Mirror, then rotate 270 degrees (anti-transpose).
    Flipped270 = 7,
}

/// An integer affine transformation in homogeneous coordinates.
///
/// Maps `(x, y)` to `(m[0][0]*x + m[0][1]*y + m[0][2], m[1][0]*x + m[1][1]*y + m[1][2])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix(pub [[i32; 3]; 3]);

impl Matrix {
    /// The identity matrix.
    pub const IDENTITY: Matrix = Matrix([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// Matrix product `self * other`: applies `other` first, then `self`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        let mut out = [[0i32; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[i][k] * other.0[k][j]).sum();
            }
        }
        Matrix(out)
    }

    /// Maps a point.
    pub fn map_point(&self, x: i32, y: i32) -> (i32, i32) {
        let m = &self.0;
        (
            m[0][0] * x + m[0][1] * y + m[0][2],
            m[1][0] * x + m[1][1] * y + m[1][2],
        )
    }
}

impl Transform {
    /// Every transform, in `wl_output` order.
    pub const ALL: [Transform; 8] = [
        Transform::Normal,
        Transform::Rotate90,
        Transform::Rotate180,
        Transform::Rotate270,
        Transform::Flipped,
        Transform::Flipped90,
        Transform::Flipped180,
        Transform::Flipped270,
    ];

    /// Transform with the given `wl_output.transform` value.
    pub fn from_raw(value: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(value).ok()?).copied()
    }

    /// The `wl_output.transform` value.
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Whether this is [`Transform::Normal`].
    pub fn is_identity(self) -> bool {
        self == Transform::Normal
    }

    /// Whether the transform mirrors.
    pub fn is_flipped(self) -> bool {
        self.parts().1
    }

    /// Whether width and height trade places.
    pub fn swaps_dimensions(self) -> bool {
        self.parts().0 % 2 == 1
    }

    /// Dimensions of a `width` x `height` buffer after the transform.
    pub fn dimensions(self, width: u16, height: u16) -> (u16, u16) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Quarter turns counter-clockwise and whether the mirror is applied first.
    fn parts(self) -> (u8, bool) {
        match self {
            Transform::Normal => (0, false),
            Transform::Rotate90 => (1, false),
            Transform::Rotate180 => (2, false),
            Transform::Rotate270 => (3, false),
            Transform::Flipped => (0, true),
            Transform::Flipped90 => (1, true),
            Transform::Flipped180 => (2, true),
            Transform::Flipped270 => (3, true),
        }
    }

    fn from_parts(turns: u8, flipped: bool) -> Self {
        match (turns % 4, flipped) {
            (0, false) => Transform::Normal,
            (1, false) => Transform::Rotate90,
            (2, false) => Transform::Rotate180,
            (_, false) => Transform::Rotate270,
            (0, true) => Transform::Flipped,
            (1, true) => Transform::Flipped90,
            (2, true) => Transform::Flipped180,
            (_, true) => Transform::Flipped270,
        }
    }

    /// The transform that undoes this one.
    pub fn inverse(self) -> Self {
        match self.parts() {
            // mirrored transforms are their own inverse
            (_, true) => self,
            (turns, false) => Self::from_parts(4 - turns, false),
        }
    }

    /// The transform equivalent to applying `self` and then `next`.
    pub fn compose(self, next: Transform) -> Self {
        let (turns, flipped) = self.parts();
        let (next_turns, next_flipped) = next.parts();
        // a mirror reverses the direction of rotations applied before it
        let turns = if next_flipped {
            next_turns + 4 - turns
        } else {
            next_turns + turns
        };
        Self::from_parts(turns, flipped ^ next_flipped)
    }

    /// The rotation/reflection part of the transform, without translation.
    pub fn linear(self) -> [[i32; 2]; 2] {
        match self {
            Transform::Normal => [[1, 0], [0, 1]],
            Transform::Rotate90 => [[0, 1], [-1, 0]],
            Transform::Rotate180 => [[-1, 0], [0, -1]],
            Transform::Rotate270 => [[0, -1], [1, 0]],
            Transform::Flipped => [[-1, 0], [0, 1]],
            Transform::Flipped90 => [[0, 1], [1, 0]],
            Transform::Flipped180 => [[1, 0], [0, -1]],
            Transform::Flipped270 => [[0, -1], [-1, 0]],
        }
    }

    /// Matrix mapping a `width` x `height` buffer onto the transformed buffer.
    ///
    /// The translation keeps the result anchored at the origin. Renderers that
    /// sample source pixels for each destination pixel need the matrix of
    /// [`inverse`](Self::inverse) with the transformed dimensions instead.
    pub fn matrix(self, width: u16, height: u16) -> Matrix {
        let [[a, b], [c, d]] = self.linear();
        let (w, h) = (i32::from(width), i32::from(height));
        // shift the most negative corner back to zero
        let tx = -(min(a, 0) * w + min(b, 0) * h);
        let ty = -(min(c, 0) * w + min(d, 0) * h);
        Matrix([[a, b, tx], [c, d, ty], [0, 0, 1]])
    }

    /// Maps a rectangle of a `width` x `height` buffer.
    pub fn apply_to_rect(self, width: u16, height: u16, rect: &Rect) -> Rect {
        debug_assert!(rect.right() <= u32::from(width) && rect.bottom() <= u32::from(height));
        map_rect(&self.matrix(width, height), rect)
    }

    /// Maps every rectangle of a damage region of a `width` x `height`
    /// buffer into the transformed buffer.
    ///
    /// The source is left untouched. Rectangle count, order and area are
    /// preserved, and so is disjointness since the mapping is an isometry of
    /// the pixel grid.
    pub fn apply_to_region(self, width: u16, height: u16, region: &Region) -> Region {
        if self.is_identity() {
            return region.clone();
        }
        let matrix = self.matrix(width, height);
        Region::from_disjoint(region.iter().map(|rect| map_rect(&matrix, rect)).collect())
    }
}

fn map_rect(matrix: &Matrix, rect: &Rect) -> Rect {
    let (x0, y0) = matrix.map_point(i32::from(rect.x), i32::from(rect.y));
    let (x1, y1) = matrix.map_point(rect.right() as i32, rect.bottom() as i32);
    Rect::new(
        min(x0, x1) as u16,
        min(y0, y1) as u16,
        x0.abs_diff(x1) as u16,
        y0.abs_diff(y1) as u16,
    )
}
