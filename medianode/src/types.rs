// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Capability identifiers and the type registry adapter.
//!
//! Nodes never compare capability names at runtime. Every name a node needs is
//! resolved once at construction through a [`TypeMap`] and cached in one of the
//! small tables defined here ([`ParamTypes`], [`FormatVideoTypes`], ...).

use std::{collections::HashMap, fmt, sync::Mutex};

use serde::{Deserialize, Serialize};

/// Opaque stable identifier for a named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Identifier that no registry ever hands out.
    pub const INVALID: TypeId = TypeId(u32::MAX);
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Well-known capability names.
pub mod names {
    pub const NODE: &str = "Spa:Interface:Node";
    pub const CLOCK: &str = "Spa:Interface:Clock";

    pub const FORMAT: &str = "Spa:Object:Format";
    pub const PROPS: &str = "Spa:Object:Props";
    pub const PROP_LIVE: &str = "Spa:Props:live";
    pub const PROP_PATTERN_TYPE: &str = "Spa:Props:patternType";

    pub const PARAM_LIST: &str = "Spa:Object:Param:List";
    pub const PARAM_LIST_ID: &str = "Spa:Object:Param:List:id";
    pub const PARAM_ID_LIST: &str = "Spa:Param:List";
    pub const PARAM_ID_PROPS: &str = "Spa:Param:Props";
    pub const PARAM_ID_ENUM_FORMAT: &str = "Spa:Param:EnumFormat";
    pub const PARAM_ID_FORMAT: &str = "Spa:Param:Format";
    pub const PARAM_ID_BUFFERS: &str = "Spa:Param:Buffers";
    pub const PARAM_ID_META: &str = "Spa:Param:Meta";

    pub const META_HEADER: &str = "Spa:Meta:Header";

    pub const MEDIA_TYPE_VIDEO: &str = "Spa:MediaType:video";
    pub const MEDIA_TYPE_AUDIO: &str = "Spa:MediaType:audio";
    pub const MEDIA_SUBTYPE_RAW: &str = "Spa:MediaSubtype:raw";

    pub const FORMAT_MEDIA_TYPE: &str = "Spa:Format:mediaType";
    pub const FORMAT_MEDIA_SUBTYPE: &str = "Spa:Format:mediaSubtype";
    pub const FORMAT_VIDEO_FORMAT: &str = "Spa:Format:Video:format";
    pub const FORMAT_VIDEO_SIZE: &str = "Spa:Format:Video:size";
    pub const FORMAT_VIDEO_FRAMERATE: &str = "Spa:Format:Video:framerate";

    pub const VIDEO_FORMAT_RGB: &str = "Spa:VideoFormat:RGB";
    pub const VIDEO_FORMAT_UYVY: &str = "Spa:VideoFormat:UYVY";

    pub const ALLOC_BUFFERS: &str = "Spa:Object:Param:Alloc:Buffers";
    pub const ALLOC_BUFFERS_SIZE: &str = "Spa:Object:Param:Alloc:Buffers:size";
    pub const ALLOC_BUFFERS_STRIDE: &str = "Spa:Object:Param:Alloc:Buffers:stride";
    pub const ALLOC_BUFFERS_BUFFERS: &str = "Spa:Object:Param:Alloc:Buffers:buffers";
    pub const ALLOC_BUFFERS_ALIGN: &str = "Spa:Object:Param:Alloc:Buffers:align";

    pub const ALLOC_META_ENABLE: &str = "Spa:Object:Param:Alloc:MetaEnable";
    pub const ALLOC_META_ENABLE_TYPE: &str = "Spa:Object:Param:Alloc:MetaEnable:type";
    pub const ALLOC_META_ENABLE_SIZE: &str = "Spa:Object:Param:Alloc:MetaEnable:size";
}

/// Process-wide registry interning capability names.
///
/// Implementations must be deterministic and idempotent: the same name always
/// maps to the same id for the lifetime of the process.
pub trait TypeMap: Send + Sync {
    /// Returns the id for `name`, interning it on first use.
    fn get_id(&self, name: &str) -> TypeId;

    /// Returns the name an id was interned from.
    fn get_type(&self, id: TypeId) -> Option<String>;

    /// Resolves a `(type, sub-key)` pair, joined as `type:sub_key`.
    fn resolve(&self, type_name: &str, sub_key: Option<&str>) -> TypeId {
        match sub_key {
            Some(sub_key) => self.get_id(&format!("{type_name}:{sub_key}")),
            None => self.get_id(type_name),
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    names: Vec<String>,
    ids: HashMap<String, TypeId>,
}

/// In-memory [`TypeMap`] handing out dense ids starting at 1.
#[derive(Default)]
pub struct TypeRegistry {
    inner: Mutex<RegistryInner>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.names.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TypeMap for TypeRegistry {
    fn get_id(&self, name: &str) -> TypeId {
        let Ok(mut inner) = self.inner.lock() else {
            tracing::error!("Type registry mutex poisoned, cannot intern {}", name);
            return TypeId::INVALID;
        };
        if let Some(id) = inner.ids.get(name) {
            return *id;
        }
        inner.names.push(name.to_owned());
        let id = TypeId(inner.names.len() as u32);
        inner.ids.insert(name.to_owned(), id);
        id
    }

    fn get_type(&self, id: TypeId) -> Option<String> {
        let inner = self.inner.lock().ok()?;
        let index = (id.0 as usize).checked_sub(1)?;
        inner.names.get(index).cloned()
    }
}

/// Parameter ids and the generic list object.
#[derive(Debug, Clone, Copy)]
pub struct ParamTypes {
    pub list: TypeId,
    pub list_id: TypeId,
    pub id_list: TypeId,
    pub id_props: TypeId,
    pub id_enum_format: TypeId,
    pub id_format: TypeId,
    pub id_buffers: TypeId,
    pub id_meta: TypeId,
}

impl ParamTypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            list: map.get_id(names::PARAM_LIST),
            list_id: map.get_id(names::PARAM_LIST_ID),
            id_list: map.get_id(names::PARAM_ID_LIST),
            id_props: map.get_id(names::PARAM_ID_PROPS),
            id_enum_format: map.get_id(names::PARAM_ID_ENUM_FORMAT),
            id_format: map.get_id(names::PARAM_ID_FORMAT),
            id_buffers: map.get_id(names::PARAM_ID_BUFFERS),
            id_meta: map.get_id(names::PARAM_ID_META),
        }
    }
}

/// Metadata kinds a buffer can carry.
#[derive(Debug, Clone, Copy)]
pub struct MetaTypes {
    pub header: TypeId,
}

impl MetaTypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            header: map.get_id(names::META_HEADER),
        }
    }
}

/// Media kinds.
#[derive(Debug, Clone, Copy)]
pub struct MediaTypes {
    pub video: TypeId,
    pub audio: TypeId,
}

impl MediaTypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            video: map.get_id(names::MEDIA_TYPE_VIDEO),
            audio: map.get_id(names::MEDIA_TYPE_AUDIO),
        }
    }
}

/// Media sub-kinds.
#[derive(Debug, Clone, Copy)]
pub struct MediaSubtypes {
    pub raw: TypeId,
}

impl MediaSubtypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            raw: map.get_id(names::MEDIA_SUBTYPE_RAW),
        }
    }
}

/// Property keys of a raw video format object.
#[derive(Debug, Clone, Copy)]
pub struct FormatVideoTypes {
    pub media_type: TypeId,
    pub media_subtype: TypeId,
    pub format: TypeId,
    pub size: TypeId,
    pub framerate: TypeId,
}

impl FormatVideoTypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            media_type: map.get_id(names::FORMAT_MEDIA_TYPE),
            media_subtype: map.get_id(names::FORMAT_MEDIA_SUBTYPE),
            format: map.get_id(names::FORMAT_VIDEO_FORMAT),
            size: map.get_id(names::FORMAT_VIDEO_SIZE),
            framerate: map.get_id(names::FORMAT_VIDEO_FRAMERATE),
        }
    }
}

/// Pixel encodings.
#[derive(Debug, Clone, Copy)]
pub struct VideoFormatTypes {
    pub rgb: TypeId,
    pub uyvy: TypeId,
}

impl VideoFormatTypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            rgb: map.get_id(names::VIDEO_FORMAT_RGB),
            uyvy: map.get_id(names::VIDEO_FORMAT_UYVY),
        }
    }
}

/// Keys of the buffer requirements object.
#[derive(Debug, Clone, Copy)]
pub struct AllocBuffersTypes {
    pub buffers_object: TypeId,
    pub size: TypeId,
    pub stride: TypeId,
    pub buffers: TypeId,
    pub align: TypeId,
}

impl AllocBuffersTypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            buffers_object: map.get_id(names::ALLOC_BUFFERS),
            size: map.get_id(names::ALLOC_BUFFERS_SIZE),
            stride: map.get_id(names::ALLOC_BUFFERS_STRIDE),
            buffers: map.get_id(names::ALLOC_BUFFERS_BUFFERS),
            align: map.get_id(names::ALLOC_BUFFERS_ALIGN),
        }
    }
}

/// Keys of the metadata requirement object.
#[derive(Debug, Clone, Copy)]
pub struct AllocMetaEnableTypes {
    pub meta_enable: TypeId,
    pub meta_type: TypeId,
    pub size: TypeId,
}

impl AllocMetaEnableTypes {
    pub fn map(map: &dyn TypeMap) -> Self {
        Self {
            meta_enable: map.get_id(names::ALLOC_META_ENABLE),
            meta_type: map.get_id(names::ALLOC_META_ENABLE_TYPE),
            size: map.get_id(names::ALLOC_META_ENABLE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_idempotent() {
        let registry = TypeRegistry::new();
        let a = registry.get_id(names::FORMAT);
        let b = registry.get_id(names::PROPS);
        assert_ne!(a, b);
        assert_eq!(a, registry.get_id(names::FORMAT));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_type(b).as_deref(), Some(names::PROPS));
        assert_eq!(registry.get_type(TypeId(0)), None);
    }

    #[test]
    fn resolve_joins_sub_key() {
        let registry = TypeRegistry::new();
        let snow = registry.resolve(names::PROP_PATTERN_TYPE, Some("snow"));
        assert_eq!(snow, registry.get_id("Spa:Props:patternType:snow"));
        assert_ne!(snow, registry.resolve(names::PROP_PATTERN_TYPE, None));
    }
}
