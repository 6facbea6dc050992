/// Header names the protocol reads or writes.
pub mod headers {
    pub const LINK: &str = "link";
    pub const SLUG: &str = "slug";
    pub const LOCATION: &str = "location";
    pub const CONTENT_TYPE: &str = "content-type";
}

/// Link relation types.
pub mod rel {
    /// Interaction model of the resource being created.
    pub const TYPE: &str = "type";
    /// Schema to plant; its presence makes a POST a plant request.
    pub const SHAPE_TREE: &str = "shapeTree";
}

pub mod media {
    pub const TURTLE: &str = "text/turtle";
    pub const JSON: &str = "application/json";
    pub const JSON_LD: &str = "application/ld+json";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}
