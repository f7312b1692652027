//! Resource-class tags recognized in project feeds.

/// The closed set of `type` tags a project item can carry once private-schema
/// keys have been rewritten.
///
/// Tags outside this set are not an error: items carrying them are skipped
/// as layers but their `layers` children, if any, are still visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Tms,
    Ngrc,
    BasemapLayer,
    QgisVectorStyle,
    MapserverStyle,
    Ngw,
    Ngfp,
    VectorLayer,
    PostgisLayer,
    FormbuilderForm,
    Dir,
    Group,
}

impl ResourceClass {
    /// Tag of a directory node; only these carry children in the tree.
    pub const DIR_TAG: &'static str = "dir";

    pub fn from_tag(tag: &str) -> Option<Self> {
        let class = match tag {
            "tms" => Self::Tms,
            "ngrc" => Self::Ngrc,
            "basemap_layer" => Self::BasemapLayer,
            "qgis_vector_style" => Self::QgisVectorStyle,
            "mapserver_style" => Self::MapserverStyle,
            "ngw" => Self::Ngw,
            "ngfp" => Self::Ngfp,
            "vector_layer" => Self::VectorLayer,
            "postgis_layer" => Self::PostgisLayer,
            "formbuilder_form" => Self::FormbuilderForm,
            "dir" => Self::Dir,
            "group" => Self::Group,
            _ => return None,
        };
        Some(class)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Tms => "tms",
            Self::Ngrc => "ngrc",
            Self::BasemapLayer => "basemap_layer",
            Self::QgisVectorStyle => "qgis_vector_style",
            Self::MapserverStyle => "mapserver_style",
            Self::Ngw => "ngw",
            Self::Ngfp => "ngfp",
            Self::VectorLayer => "vector_layer",
            Self::PostgisLayer => "postgis_layer",
            Self::FormbuilderForm => "formbuilder_form",
            Self::Dir => "dir",
            Self::Group => "group",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_tag() {
        let all = [
            ResourceClass::Tms,
            ResourceClass::Ngrc,
            ResourceClass::BasemapLayer,
            ResourceClass::QgisVectorStyle,
            ResourceClass::MapserverStyle,
            ResourceClass::Ngw,
            ResourceClass::Ngfp,
            ResourceClass::VectorLayer,
            ResourceClass::PostgisLayer,
            ResourceClass::FormbuilderForm,
            ResourceClass::Dir,
            ResourceClass::Group,
        ];
        for class in all {
            assert_eq!(ResourceClass::from_tag(class.tag()), Some(class));
        }
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(ResourceClass::from_tag("raster_style"), None);
        assert_eq!(ResourceClass::from_tag(""), None);
    }
}
