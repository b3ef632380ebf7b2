//! Tool-neutral board features.
//!
//! Maps a parsed [`Document`] onto the small vocabulary most PCB design tools
//! share: cutouts, keepouts and annotation text, each tagged with the board
//! side it applies to. Emitting a particular tool's API calls is left to the
//! consumer.

use serde::Serialize;

use crate::config::FeatureConfig;
use crate::idf::{Circle, Document, Point, Shape};

/// Feature name given to placement keepouts.
pub const PLACEMENT_KEEPOUT_NAME: &str = "Placement Keepout";
/// Feature name given to assembly notes.
pub const NOTE_NAME: &str = "Assembly Notes";
/// Feature name given to component placement markers.
pub const MARKER_NAME: &str = "Component Placement";

/// Copper layers a feature applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSet {
    /// Every layer.
    #[default]
    All,
    /// Top (component side) only.
    Top,
    /// Bottom (solder side) only.
    Bottom,
}

impl LayerSet {
    /// Interprets an IDF side/layer tag.
    ///
    /// `TOP`/`COMPONENT` and `BOTTOM`/`SOLDER` select one side; everything
    /// else (including `ALL`, `BOTH` and an empty tag) selects every layer.
    #[must_use]
    pub fn from_idf(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "TOP" | "COMPONENT" => Self::Top,
            "BOTTOM" | "SOLDER" => Self::Bottom,
            _ => Self::All,
        }
    }
}

/// Text anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Bottom-left corner at the position.
    SouthWest,
    /// Centre at the position.
    Center,
}

/// A piece of annotation text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Feature name.
    pub name: &'static str,
    /// Text content.
    pub text: String,
    /// Text size in mm.
    pub size: f64,
    /// Anchor point.
    pub anchor: Anchor,
    /// Position in mm.
    pub position: Point,
    /// Board side.
    pub layers: LayerSet,
}

/// A board feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "feature", rename_all = "snake_case")]
pub enum Feature {
    /// Material removed from the board.
    Cutout {
        /// Region to remove.
        shape: Shape,
    },
    /// Region where copper pour and/or vias are forbidden.
    KeepOut {
        /// Restricted region.
        shape: Shape,
        /// Layers the restriction applies to.
        layers: LayerSet,
        /// Copper pour is forbidden.
        pour: bool,
        /// Vias are forbidden.
        via: bool,
    },
    /// Region where components may not be placed.
    PlacementKeepout {
        /// Restricted region.
        shape: Shape,
        /// Board side.
        layers: LayerSet,
        /// Maximum component height in mm, `0.0` for none allowed.
        height: f64,
    },
    /// Assembly note text.
    Note(Annotation),
    /// Reference designator marker at a component origin.
    PlacementMarker(Annotation),
}

/// Maps a document onto board features.
///
/// Order: board cutouts, drilled holes, route keepouts, via keepouts,
/// placement keepouts, notes, placement markers.
#[must_use]
pub fn map_features(document: &Document, config: &FeatureConfig) -> Vec<Feature> {
    let mut features = Vec::new();

    features.extend(
        document
            .board_cutouts
            .iter()
            .map(|shape| Feature::Cutout {
                shape: shape.clone(),
            }),
    );

    features.extend(document.holes.iter().map(|hole| Feature::Cutout {
        shape: Shape::Circle(Circle::new(hole.position, hole.diameter * 0.5)),
    }));

    features.extend(document.route_keepouts.iter().map(|keepout| Feature::KeepOut {
        shape: keepout.shape.clone(),
        layers: LayerSet::from_idf(&keepout.layers),
        pour: true,
        via: false,
    }));

    features.extend(document.via_keepouts.iter().map(|keepout| Feature::KeepOut {
        shape: keepout.shape.clone(),
        layers: LayerSet::All,
        pour: false,
        via: true,
    }));

    features.extend(
        document
            .place_keepouts
            .iter()
            .map(|keepout| Feature::PlacementKeepout {
                shape: keepout.shape.clone(),
                layers: LayerSet::from_idf(&keepout.layers),
                height: keepout.thickness,
            }),
    );

    features.extend(document.notes.iter().map(|note| {
        Feature::Note(Annotation {
            name: NOTE_NAME,
            text: note.text.clone(),
            size: note.height,
            anchor: Anchor::SouthWest,
            position: note.position,
            layers: LayerSet::All,
        })
    }));

    features.extend(document.placement.iter().map(|part| {
        Feature::PlacementMarker(Annotation {
            name: MARKER_NAME,
            text: part.refdes.clone(),
            size: config.marker_text_size,
            anchor: Anchor::Center,
            position: part.position,
            layers: LayerSet::from_idf(&part.side),
        })
    }));

    tracing::debug!(count = features.len(), "Mapped board features");
    features
}
