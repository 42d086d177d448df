// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A preprocessed page and the rotation it is currently viewed at.

use image::DynamicImage;

use super::processor::rotate_expanded;

/// A preprocessed page image together with its current rotation.
///
/// The source pixels are never modified: every rotation is computed from the
/// unrotated source, so stepping through many candidate angles does not
/// accumulate resampling blur.
#[derive(Debug, Clone)]
pub struct PageImage {
    source: DynamicImage,
    angle: i32,
}

impl PageImage {
    pub fn new(source: DynamicImage) -> Self {
        Self { source, angle: 0 }
    }

    /// Current rotation in degrees, counter-clockwise.
    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.source.width(), self.source.height())
    }

    /// The page as it looks at its current rotation.
    pub fn view(&self) -> DynamicImage {
        self.view_at(self.angle)
    }

    /// The page as it would look at `angle` degrees.
    pub fn view_at(&self, angle: i32) -> DynamicImage {
        rotate_expanded(&self.source, angle)
    }

    pub fn set_angle(&mut self, angle: i32) {
        self.angle = angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, Luma};

    #[test]
    fn views_are_rotated_from_the_source() {
        let mut page = PageImage::new(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            30,
            10,
            Luma([255u8]),
        )));
        assert_eq!(page.angle(), 0);
        assert_eq!(page.view_at(90).dimensions(), (10, 30));

        page.set_angle(1);
        page.set_angle(2);
        assert_eq!(page.angle(), 2);
        assert_eq!(page.view().dimensions(), page.view_at(2).dimensions());
        // The source itself never changes.
        assert_eq!(page.dimensions(), (30, 10));
    }
}
