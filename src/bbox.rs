use crate::error::Error;
use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug + Copy + Clone + PartialEq {}

/// Left-top-width-height format, contains left top corner and width-height
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// X-y-width-height format, contains coordinates of the center of bbox and width-height
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Xywh;
impl BBoxFormat for Xywh {}

/// Four coordinates tagged with their format. Serialized as a plain `[f32; 4]`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(transparent, bound = "")]
pub struct BBox<F: BBoxFormat> {
    coords: [f32; 4],
    #[serde(skip)]
    format: PhantomData<F>,
}

/// The box type used everywhere in source-image pixel coordinates.
pub type BoundingBox = BBox<Ltrb>;

impl<F: BBoxFormat> From<BBox<F>> for [f32; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.coords
    }
}

impl<F: BBoxFormat> BBox<F> {
    #[inline(always)]
    fn from_coords(coords: [f32; 4]) -> Self {
        BBox {
            coords,
            format: PhantomData,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32; 4] {
        &self.coords
    }
}

impl BBox<Ltwh> {
    #[inline]
    pub fn ltwh(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox::from_coords([x1, x2, x3, x4])
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.coords[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.coords[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.coords[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.coords[3]
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox::from_coords([x1, x2, x3, x4])
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.coords[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.coords[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.coords[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.coords[3]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.coords[2] - self.coords[0]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.coords[3] - self.coords[1]
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new(
            (self.coords[0] + self.coords[2]) / 2.0,
            (self.coords[1] + self.coords[3]) / 2.0,
        )
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// True when the box has no positive width or height (NaN included).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Area of the axis-aligned overlap, zero for disjoint boxes.
    pub fn intersection_area(&self, other: &BBox<Ltrb>) -> f32 {
        let i_w = (self.right().min(other.right()) - self.left().max(other.left())).max(0.0);
        let i_h = (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0);

        i_w * i_h
    }

    pub fn iou(&self, other: &BBox<Ltrb>) -> Result<f32, Error> {
        for b in [self, other] {
            if b.is_degenerate() {
                let [l, t, r, b] = b.coords;
                return Err(Error::DegenerateBox(l, t, r, b));
            }
        }

        let i_area = self.intersection_area(other);

        Ok(i_area / (self.area() + other.area() - i_area))
    }

    #[inline]
    pub fn distance(&self, other: &BBox<Ltrb>) -> f32 {
        na::distance(&self.center(), &other.center())
    }
}

impl BBox<Xywh> {
    #[inline]
    pub fn xywh(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox::from_coords([x1, x2, x3, x4])
    }

    #[inline(always)]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    #[inline(always)]
    pub fn cx(&self) -> f32 {
        self.coords[0]
    }

    #[inline(always)]
    pub fn cy(&self) -> f32 {
        self.coords[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.coords[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.coords[3]
    }
}

/// Euclidean distance between box centers.
#[inline]
pub fn distance(a: &BoundingBox, b: &BoundingBox) -> f32 {
    a.distance(b)
}

#[inline]
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> Result<f32, Error> {
    a.iou(b)
}

impl<'a> From<&'a BBox<Ltwh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Ltwh>) -> Self {
        let [l, t, w, h] = v.coords;
        Self::from_coords([l, t, l + w, t + h])
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        let [l, t, r, b] = v.coords;
        Self::from_coords([l, t, r - l, b - t])
    }
}

impl<'a> From<&'a BBox<Xywh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Xywh>) -> Self {
        let [x, y, w, h] = v.coords;
        Self::from_coords([x - w / 2.0, y - h / 2.0, x + w / 2.0, y + h / 2.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_boxes() -> Vec<BoundingBox> {
        vec![
            BBox::ltrb(0.0, 0.0, 100.0, 100.0),
            BBox::ltrb(50.0, 50.0, 150.0, 150.0),
            BBox::ltrb(10.0, 20.0, 30.0, 90.0),
            BBox::ltrb(200.0, 200.0, 210.0, 205.0),
            BBox::ltrb(-20.0, 40.0, 60.0, 41.5),
        ]
    }

    #[test]
    fn center_and_area() {
        let b = BBox::ltrb(10.0, 20.0, 30.0, 60.0);
        assert_eq!(b.center(), na::Point2::new(20.0, 40.0));
        assert_eq!(b.area(), 800.0);
    }

    #[test]
    fn iou_partial_overlap() {
        let a = BBox::ltrb(0.0, 0.0, 100.0, 100.0);
        let b = BBox::ltrb(50.0, 50.0, 150.0, 150.0);
        assert_relative_eq!(iou(&a, &b).unwrap(), 2500.0 / 17500.0);
    }

    #[test]
    fn iou_disjoint_is_zero() {
        let a = BBox::ltrb(0.0, 0.0, 50.0, 50.0);
        let b = BBox::ltrb(100.0, 100.0, 200.0, 200.0);
        assert_eq!(iou(&a, &b).unwrap(), 0.0);

        // touching edges do not overlap either
        let c = BBox::ltrb(50.0, 0.0, 80.0, 50.0);
        assert_eq!(iou(&a, &c).unwrap(), 0.0);
    }

    #[test]
    fn iou_symmetric_bounded_and_reflexive() {
        let boxes = sample_boxes();
        for a in &boxes {
            assert_relative_eq!(iou(a, a).unwrap(), 1.0);
            for b in &boxes {
                let ab = iou(a, b).unwrap();
                let ba = iou(b, a).unwrap();
                assert_eq!(ab, ba);
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn iou_rejects_degenerate_boxes() {
        let a = BBox::ltrb(0.0, 0.0, 100.0, 100.0);
        let flat = BBox::ltrb(10.0, 10.0, 10.0, 50.0);
        assert!(matches!(iou(&a, &flat), Err(Error::DegenerateBox(..))));
        assert!(matches!(iou(&flat, &flat), Err(Error::DegenerateBox(..))));

        let nan = BBox::ltrb(f32::NAN, 0.0, 10.0, 10.0);
        assert!(nan.is_degenerate());
    }

    #[test]
    fn center_distance() {
        let a = BBox::ltrb(0.0, 0.0, 10.0, 10.0);
        let b = BBox::ltrb(30.0, 40.0, 40.0, 50.0);
        assert_relative_eq!(distance(&a, &b), 50.0);
    }

    #[test]
    fn format_conversions() {
        let c = BBox::xywh(50.0, 40.0, 20.0, 10.0).as_ltrb();
        assert_eq!(c.as_slice(), &[40.0, 35.0, 60.0, 45.0]);

        let lt = c.as_ltwh();
        assert_eq!(lt.as_slice(), &[40.0, 35.0, 20.0, 10.0]);
        assert_eq!(lt.as_ltrb(), c);
    }

    #[test]
    fn serializes_as_plain_array() {
        let b = BBox::ltrb(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");

        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
