//! Core units, constants, and shared primitives for the Earth–Moon field workspace.

pub mod quadrature;

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Newtonian gravitational constant (m³ kg⁻¹ s⁻²).
    pub const G: f64 = 6.674e-11;
    /// Floor applied to point-mass separations before dividing (m).
    pub const MIN_SEPARATION_M: f64 = 1_000.0;
    /// Floor applied to squared separations in the force law (m²).
    pub const MIN_SEPARATION_SQ_M2: f64 = MIN_SEPARATION_M * MIN_SEPARATION_M;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert joules per kilogram to megajoules per kilogram.
    #[inline]
    pub fn j_to_mj(v: f64) -> f64 {
        v / 1.0e6
    }
}

/// Minimal planar vector helpers to avoid ad-hoc `[f64; 2]` math everywhere.
pub mod vector {
    /// Alias for a 2D vector in metres or newtons depending on context.
    pub type Vector2 = [f64; 2];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector2) -> f64 {
        v[0].hypot(v[1])
    }

    /// Squared Euclidean norm.
    #[inline]
    pub fn norm_squared(v: &Vector2) -> f64 {
        dot(v, v)
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector2, b: &Vector2) -> f64 {
        a[0] * b[0] + a[1] * b[1]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector2, b: &Vector2) -> Vector2 {
        [a[0] + b[0], a[1] + b[1]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector2, b: &Vector2) -> Vector2 {
        [a[0] - b[0], a[1] - b[1]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector2, s: f64) -> Vector2 {
        [v[0] * s, v[1] * s]
    }

    /// Unit vector along `v`, or the zero vector when `v` has no length.
    #[inline]
    pub fn unit(v: &Vector2) -> Vector2 {
        let n = norm(v);
        if n > 0.0 { scale(v, 1.0 / n) } else { [0.0, 0.0] }
    }
}

/// Evenly spaced samples over `[start, stop]`, endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Logarithmically spaced samples over `[start, stop]`; both bounds must be positive.
pub fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let (lo, hi) = (start.log10(), stop.log10());
    linspace(lo, hi, n)
        .into_iter()
        .enumerate()
        .map(|(i, e)| match i {
            0 => start,
            _ if i == n - 1 => stop,
            _ => 10f64.powf(e),
        })
        .collect()
}
