use std::fmt;

#[derive(Default, PartialEq, Eq, Copy, Clone)]
pub struct Res {
    pub w: u32,
    pub h: u32,
}

impl fmt::Debug for Res {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

impl fmt::Display for Res {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

impl From<(u32, u32)> for Res {
    fn from(wh: (u32, u32)) -> Self {
        Self { w: wh.0, h: wh.1 }
    }
}

impl Res {
    pub const fn is_zero_area(self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub const fn area(self) -> u64 {
        self.w as u64 * self.h as u64
    }

    // True when both spans are whole multiples of other's. Pixel-aligned
    // integer growth collapses to nearest-neighbor replication.
    pub const fn is_integer_multiple_of(self, other: Self) -> bool {
        !other.is_zero_area() && self.w % other.w == 0 && self.h % other.h == 0
    }

    pub const fn shrinks_from(self, src: Self) -> bool {
        self.w <= src.w && self.h <= src.h
    }
}

#[cfg(test)]
mod tests {
    use super::Res;

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Res { w: 1920, h: 1080 }), "1920x1080");
    }

    #[test]
    fn integer_multiples() {
        let small: Res = (10, 10).into();
        assert!(Res::from((40, 40)).is_integer_multiple_of(small));
        assert!(Res::from((10, 30)).is_integer_multiple_of(small));
        assert!(!Res::from((15, 40)).is_integer_multiple_of(small));
        assert!(!Res::from((5, 40)).is_integer_multiple_of(small));
        assert!(!Res::from((40, 40)).is_integer_multiple_of((0, 10).into()));
    }
}
