//! # Dense Volumes
//!
//! Dense 3D arrays handed over by the viewer, stored C-contiguous in display
//! order `(z, y, x)` together with a per-axis physical scale.
//!
//! Models address volumes in world order. [`Volume::world`] is the single
//! place where that flip happens: it returns a zero-copy [`WorldView`] indexed
//! `(x, y, z)`.

use crate::coords::Invert;
use crate::error::{GeometryError, GeometryResult};
use serde::{Deserialize, Serialize};

/// A dense display-ordered volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume<T> {
    data: Vec<T>,
    shape: [usize; 3],
    scale: [f64; 3],
}

impl<T: Copy> Volume<T> {
    /// Wraps display-ordered data.
    ///
    /// # Errors
    ///
    /// Fails if `data.len()` does not match the product of `shape`.
    pub fn new(data: Vec<T>, shape: [usize; 3], scale: [f64; 3]) -> GeometryResult<Self> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(GeometryError::invalid_parameter(
                "data",
                format!("length {} does not match shape {:?}", data.len(), shape),
            ));
        }
        Ok(Self { data, shape, scale })
    }

    /// Builds a volume by evaluating `f(z, y, x)` at every voxel.
    pub fn from_fn(shape: [usize; 3], scale: [f64; 3], f: impl Fn(usize, usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(shape.iter().product());
        for z in 0..shape[0] {
            for y in 0..shape[1] {
                for x in 0..shape[2] {
                    data.push(f(z, y, x));
                }
            }
        }
        Self { data, shape, scale }
    }

    /// Display-ordered shape `(nz, ny, nx)`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Display-ordered physical scale.
    #[inline]
    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }

    /// Raw display-ordered data.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Value at display index `(z, y, x)`.
    #[inline]
    pub fn get(&self, z: usize, y: usize, x: usize) -> T {
        self.data[(z * self.shape[1] + y) * self.shape[2] + x]
    }

    /// World-ordered view of this volume.
    #[inline]
    pub fn world(&self) -> WorldView<'_, T> {
        WorldView { volume: self }
    }

    /// Builds a display-ordered volume from world-ordered data.
    ///
    /// `data` is C-contiguous over `world_shape = (nx, ny, nz)`; this is the
    /// exit counterpart of [`Volume::world`].
    pub fn from_world(data: Vec<T>, world_shape: [usize; 3], scale: [f64; 3]) -> GeometryResult<Self> {
        let [nx, ny, nz] = world_shape;
        if data.len() != nx * ny * nz {
            return Err(GeometryError::invalid_parameter(
                "data",
                format!("length {} does not match world shape {:?}", data.len(), world_shape),
            ));
        }
        let mut display = Vec::with_capacity(data.len());
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    display.push(data[(x * ny + y) * nz + z]);
                }
            }
        }
        Self::new(display, world_shape.invert(), scale)
    }

    /// Extracts the 2D slice at `index` along display `axis`.
    ///
    /// Returns `(rows, cols, values)` where rows and cols are the remaining
    /// display axes in increasing order.
    pub fn slice(&self, axis: usize, index: usize) -> GeometryResult<(usize, usize, Vec<T>)> {
        if axis > 2 {
            return Err(GeometryError::invalid_parameter("axis", format!("must be 0, 1 or 2, got {axis}")));
        }
        if index >= self.shape[axis] {
            return Err(GeometryError::invalid_parameter(
                "index",
                format!("{index} out of range for axis of length {}", self.shape[axis]),
            ));
        }
        let (a, b) = match axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let (rows, cols) = (self.shape[a], self.shape[b]);
        let mut values = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let mut idx = [0usize; 3];
                idx[axis] = index;
                idx[a] = r;
                idx[b] = c;
                values.push(self.get(idx[0], idx[1], idx[2]));
            }
        }
        Ok((rows, cols, values))
    }
}

/// World-ordered `(x, y, z)` view of a display-ordered [`Volume`].
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a, T> {
    volume: &'a Volume<T>,
}

impl<'a, T: Copy> WorldView<'a, T> {
    /// World-ordered shape `(nx, ny, nz)`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.volume.shape.invert()
    }

    /// Value at world index `(x, y, z)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.volume.get(z, y, x)
    }
}
