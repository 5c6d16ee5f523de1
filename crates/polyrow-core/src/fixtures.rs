// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Toy payload family used by unit tests.
#![allow(clippy::expect_used)]

use serde_json::Value;

use crate::coerce::{self, FieldReader};
use crate::discriminator::Discriminator;
use crate::document::Document;
use crate::error::{FieldErrorKind, ValidationError};
use crate::registry::{RegistryBuilder, VariantRegistry};
use crate::variant::{Payload, Variant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
}

impl Discriminator for ShapeKind {
    const ALL: &'static [Self] = &[Self::Circle, Self::Square, Self::Triangle];

    fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circle {
    pub radius: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Square {
    pub side: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub base: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle(Circle),
    Square(Square),
    Triangle(Triangle),
}

impl Payload for Shape {
    type Kind = ShapeKind;

    fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle(_) => Circle::KIND,
            Self::Square(_) => Square::KIND,
            Self::Triangle(_) => Triangle::KIND,
        }
    }

    fn dump(&self) -> Document {
        match self {
            Self::Circle(inner) => inner.dump(),
            Self::Square(inner) => inner.dump(),
            Self::Triangle(inner) => inner.dump(),
        }
    }
}

impl Variant for Circle {
    type Payload = Shape;
    const KIND: ShapeKind = ShapeKind::Circle;
    const FIELDS: &'static [&'static str] = &["radius"];

    fn cast(raw: &Document) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(raw);
        let radius = fields.required("radius", coerce::uint32);
        if radius == Some(0) {
            fields.reject("radius", FieldErrorKind::constraint("must be positive"));
        }
        fields.finish_with(|| Some(Self { radius: radius? }))
    }

    fn write_fields(&self, out: &mut Document) {
        out.insert("radius".into(), Value::from(self.radius));
    }

    fn into_payload(self) -> Shape {
        Shape::Circle(self)
    }
}

impl Variant for Square {
    type Payload = Shape;
    const KIND: ShapeKind = ShapeKind::Square;
    const FIELDS: &'static [&'static str] = &["side"];

    fn cast(raw: &Document) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(raw);
        let side = fields.required("side", coerce::uint32);
        fields.finish_with(|| Some(Self { side: side? }))
    }

    fn write_fields(&self, out: &mut Document) {
        out.insert("side".into(), Value::from(self.side));
    }

    fn into_payload(self) -> Shape {
        Shape::Square(self)
    }
}

impl Variant for Triangle {
    type Payload = Shape;
    const KIND: ShapeKind = ShapeKind::Triangle;
    const FIELDS: &'static [&'static str] = &["base", "height"];

    fn cast(raw: &Document) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(raw);
        let base = fields.required("base", coerce::uint32);
        let height = fields.required("height", coerce::uint32);
        fields.finish_with(|| {
            Some(Self {
                base: base?,
                height: height?,
            })
        })
    }

    fn write_fields(&self, out: &mut Document) {
        out.insert("base".into(), Value::from(self.base));
        out.insert("height".into(), Value::from(self.height));
    }

    fn into_payload(self) -> Shape {
        Shape::Triangle(self)
    }
}

/// Registry with circle and square only (triangle left out on purpose).
pub fn partial_registry() -> VariantRegistry<Shape> {
    let mut builder = RegistryBuilder::new();
    builder.register::<Circle>().expect("register circle");
    builder.register::<Square>().expect("register square");
    builder.build().expect("partial registry")
}

/// Registry covering every shape.
pub fn full_registry() -> VariantRegistry<Shape> {
    let mut builder = RegistryBuilder::new();
    builder.register::<Circle>().expect("register circle");
    builder.register::<Square>().expect("register square");
    builder.register::<Triangle>().expect("register triangle");
    builder.build_complete().expect("full registry")
}

pub fn doc(value: Value) -> Document {
    crate::document::document_from_value(value).expect("fixture is not an object")
}
