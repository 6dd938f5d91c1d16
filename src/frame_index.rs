//! Frame index mapping for multi-surface images.
//!
//! Frames of a container are stored flat. For cubemaps all mips of one face are
//! contiguous before the next face begins (face-major, mip-minor), so
//! `flat = face * mips_per_face + mip` with zero-based face and mip.

/// Number of faces in a cubemap.
pub const CUBE_FACES: usize = 6;

/// Static layout of a loaded container. Fixed until the image is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContainerShape {
    pub total_frames: usize,
    pub faces_per_cube: usize,
    pub mips_per_face: usize,
}

impl FrameContainerShape {
    pub fn new(total_frames: usize, has_cubemap: bool) -> Self {
        let faces_per_cube = if has_cubemap { CUBE_FACES } else { 1 };
        Self {
            total_frames,
            faces_per_cube,
            mips_per_face: total_frames / faces_per_cube,
        }
    }

    /// Highest valid flat index. Zero for an empty container.
    pub fn last_index(&self) -> usize {
        self.total_frames.saturating_sub(1)
    }

    /// Saturating clamp of a (possibly negative) flat index into `[0, total_frames-1]`.
    pub fn clamp_flat(&self, flat: i64) -> usize {
        if flat <= 0 {
            0
        } else {
            (flat as usize).min(self.last_index())
        }
    }

    /// Cube coordinate of a flat index. Only meaningful when `mips_per_face >= 1`.
    pub fn cube_coordinate(&self, flat: usize) -> CubeCoordinate {
        to_cube_coordinate(flat, self.mips_per_face)
    }

    /// Flat index for a one-based face/mip pair, clamping both to the cube bounds first.
    pub fn flat_from_cube(&self, face: i64, mip: i64) -> usize {
        let coord = CubeCoordinate {
            face: clamp_one_based(face, self.faces_per_cube),
            mip: clamp_one_based(mip, self.mips_per_face),
        };
        from_cube_coordinate(coord, self.mips_per_face)
    }
}

/// One-based cubemap face and mip numbers as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeCoordinate {
    pub face: usize,
    pub mip: usize,
}

/// The persisted frame position. Derived coordinates are never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCoordinate {
    pub flat_index: usize,
}

impl FrameCoordinate {
    pub fn new(flat_index: usize) -> Self {
        Self { flat_index }
    }

    pub fn set_clamped(&mut self, flat: i64, shape: &FrameContainerShape) {
        self.flat_index = shape.clamp_flat(flat);
    }

    pub fn one_based(&self) -> usize {
        self.flat_index + 1
    }
}

/// `mips_per_face` must be at least 1.
pub fn to_cube_coordinate(flat: usize, mips_per_face: usize) -> CubeCoordinate {
    let face = flat / mips_per_face + 1;
    let mip = flat - (face - 1) * mips_per_face + 1;
    CubeCoordinate { face, mip }
}

/// Pure transform. Callers clamp face to `[1, 6]` and mip to `[1, mips_per_face]`.
pub fn from_cube_coordinate(coord: CubeCoordinate, mips_per_face: usize) -> usize {
    (coord.face - 1) * mips_per_face + (coord.mip - 1)
}

/// Result may be negative for user input of zero or less; callers clamp.
pub fn to_flat_from_one_based(one_based: i64) -> i64 {
    one_based - 1
}

fn clamp_one_based(value: i64, count: usize) -> usize {
    value.clamp(1, count.max(1) as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_coordinates_for_two_mip_cubemap() {
        let shape = FrameContainerShape::new(12, true);
        assert_eq!(shape.mips_per_face, 2);
        assert_eq!(shape.faces_per_cube * shape.mips_per_face, shape.total_frames);

        assert_eq!(shape.cube_coordinate(0), CubeCoordinate { face: 1, mip: 1 });
        assert_eq!(shape.cube_coordinate(1), CubeCoordinate { face: 1, mip: 2 });
        assert_eq!(shape.cube_coordinate(2), CubeCoordinate { face: 2, mip: 1 });
        assert_eq!(shape.cube_coordinate(11), CubeCoordinate { face: 6, mip: 2 });
    }

    #[test]
    fn test_cube_round_trip_every_frame() {
        for mips in 1..=5 {
            let shape = FrameContainerShape::new(CUBE_FACES * mips, true);
            for flat in 0..shape.total_frames {
                let coord = to_cube_coordinate(flat, shape.mips_per_face);
                assert_eq!(from_cube_coordinate(coord, shape.mips_per_face), flat);
            }
        }
    }

    #[test]
    fn test_non_cubemap_shape() {
        let shape = FrameContainerShape::new(9, false);
        assert_eq!(shape.faces_per_cube, 1);
        assert_eq!(shape.mips_per_face, 9);
    }

    #[test]
    fn test_flat_from_cube_clamps_face_and_mip() {
        let shape = FrameContainerShape::new(18, true);
        // Face 7 snaps to 6, mip 0 snaps to 1.
        assert_eq!(shape.flat_from_cube(7, 0), 15);
        assert_eq!(shape.flat_from_cube(-3, 99), 2);
        assert_eq!(shape.flat_from_cube(2, 2), 4);
    }

    #[test]
    fn test_one_based_to_flat_is_clamped_by_caller() {
        let shape = FrameContainerShape::new(4, false);
        let mut coord = FrameCoordinate::default();

        coord.set_clamped(to_flat_from_one_based(0), &shape);
        assert_eq!(coord.flat_index, 0);

        coord.set_clamped(to_flat_from_one_based(3), &shape);
        assert_eq!(coord.flat_index, 2);
        assert_eq!(coord.one_based(), 3);

        coord.set_clamped(to_flat_from_one_based(40), &shape);
        assert_eq!(coord.flat_index, 3);
    }

    #[test]
    fn test_clamp_flat_on_empty_container() {
        let shape = FrameContainerShape::new(0, false);
        assert_eq!(shape.clamp_flat(5), 0);
        assert_eq!(shape.clamp_flat(-1), 0);
    }
}
