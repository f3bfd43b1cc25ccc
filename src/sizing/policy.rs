use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::*;

/// Kernel tables whose capacity is decided at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapKind {
    Auth,
    CtGlobalTcp,
    CtGlobalAny,
    NatGlobal,
    NeighGlobal,
    SockRevNat,
    Fragments,
}

/// `(default, min, max)` entries fed to the dynamic size calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSizePolicy {
    pub default_entries: usize,
    pub min_entries: usize,
    pub max_entries: usize,
}

impl MapKind {
    /// Tables sized by the coordinator, in the order they are resolved.
    pub const DYNAMIC_SIZING_ORDER: [MapKind; 4] = [
        MapKind::CtGlobalTcp,
        MapKind::CtGlobalAny,
        MapKind::NatGlobal,
        MapKind::NeighGlobal,
    ];

    /// Option key overriding this table's size, if there is one
    pub fn option_name(self) -> &'static str {
        match self {
            MapKind::Auth => AUTH_MAP_ENTRIES_NAME,
            MapKind::CtGlobalTcp => CT_MAP_ENTRIES_GLOBAL_TCP_NAME,
            MapKind::CtGlobalAny => CT_MAP_ENTRIES_GLOBAL_ANY_NAME,
            MapKind::NatGlobal => NAT_MAP_ENTRIES_GLOBAL_NAME,
            MapKind::NeighGlobal => NEIGH_MAP_ENTRIES_GLOBAL_NAME,
            MapKind::SockRevNat => SOCK_REV_NAT_MAP_ENTRIES_NAME,
            MapKind::Fragments => FRAGMENTS_MAP_ENTRIES_NAME,
        }
    }

    pub fn policy(self) -> MapSizePolicy {
        let (default_entries, min_entries, max_entries) = match self {
            MapKind::Auth => (AUTH_MAP_ENTRIES_DEFAULT, AUTH_MAP_ENTRIES_MIN, AUTH_MAP_ENTRIES_MAX),
            MapKind::CtGlobalTcp => (
                CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT,
                LIMIT_TABLE_AUTO_GLOBAL_TCP_MIN,
                LIMIT_TABLE_MAX,
            ),
            MapKind::CtGlobalAny => (
                CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT,
                LIMIT_TABLE_AUTO_GLOBAL_ANY_MIN,
                LIMIT_TABLE_MAX,
            ),
            // Neighbor entries follow NAT
            MapKind::NatGlobal | MapKind::NeighGlobal => (
                NAT_MAP_ENTRIES_GLOBAL_DEFAULT,
                LIMIT_TABLE_AUTO_NAT_GLOBAL_MIN,
                LIMIT_TABLE_MAX,
            ),
            MapKind::SockRevNat => (
                SOCK_REV_NAT_MAP_ENTRIES_DEFAULT,
                LIMIT_TABLE_AUTO_SOCK_REV_NAT_MIN,
                LIMIT_TABLE_MAX,
            ),
            MapKind::Fragments => (FRAGMENTS_MAP_ENTRIES_DEFAULT, FRAGMENTS_MAP_MIN, FRAGMENTS_MAP_MAX),
        };
        MapSizePolicy {
            default_entries,
            min_entries,
            max_entries,
        }
    }

    /// Hard `(min, max)` a resolved size must respect, however it was produced.
    pub fn limits(self) -> (usize, usize) {
        match self {
            MapKind::Auth => (AUTH_MAP_ENTRIES_MIN, AUTH_MAP_ENTRIES_MAX),
            MapKind::Fragments => (FRAGMENTS_MAP_MIN, FRAGMENTS_MAP_MAX),
            _ => (LIMIT_TABLE_MIN, LIMIT_TABLE_MAX),
        }
    }
}

/// Key + value size in bytes of one element per table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapElementSizes {
    pub ct: usize,
    pub nat: usize,
    pub neigh: usize,
    pub sock_rev: usize,
}

impl MapElementSizes {
    pub fn datapath_defaults() -> Self {
        Self {
            ct: SIZEOF_CT_ELEMENT,
            nat: SIZEOF_NAT_ELEMENT,
            neigh: SIZEOF_NEIGH_ELEMENT,
            sock_rev: SIZEOF_SOCK_REV_ELEMENT,
        }
    }

    /// Dynamic sizing needs all four sizes.
    pub fn is_complete(&self) -> bool {
        self.ct != 0 && self.nat != 0 && self.neigh != 0 && self.sock_rev != 0
    }

    /// Bytes the canonical tables occupy at their default sizes.
    ///
    /// The neighbor table holds as many entries as NAT does by default.
    pub fn default_map_memory(&self) -> u128 {
        let weighted = |entries: usize, size: usize| entries as u128 * size as u128;
        weighted(CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT, self.ct)
            + weighted(CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT, self.ct)
            + weighted(NAT_MAP_ENTRIES_GLOBAL_DEFAULT, self.nat)
            + weighted(NAT_MAP_ENTRIES_GLOBAL_DEFAULT, self.neigh)
            + weighted(SOCK_REV_NAT_MAP_ENTRIES_DEFAULT, self.sock_rev)
    }
}

/// Tables whose size the operator set explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSizeOverrides(BTreeSet<MapKind>);

impl MapSizeOverrides {
    pub fn insert(
        &mut self,
        kind: MapKind,
    ) {
        self.0.insert(kind);
    }

    pub fn contains(
        &self,
        kind: MapKind,
    ) -> bool {
        self.0.contains(&kind)
    }
}
