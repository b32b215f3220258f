//! Host record decoding from directory attributes.
//!
//! The attribute reader hands over the values of `cn` (canonical name and
//! aliases) and `ipHostNumber` (textual addresses). [`parse_host`] lays them
//! out as a [`HostEnt`] in the caller's arena.

use super::family::{classify, FamilyFilter};
use super::record::{AddressTable, HostEnt};
use crate::config::ResolverOptions;
use crate::error::{Result, WireError};
use crate::protocol::Arena;
use crate::set::ValueSet;

/// Attribute values of one host entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAttributes {
    /// `cn` values; the first one is the canonical name.
    pub cn: Vec<String>,
    /// `ipHostNumber` values.
    pub ip_host_number: Vec<String>,
}

impl HostAttributes {
    /// Build from name and address values.
    pub fn new<N, A>(cn: N, ip_host_number: A) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            cn: cn.into_iter().map(Into::into).collect(),
            ip_host_number: ip_host_number.into_iter().map(Into::into).collect(),
        }
    }
}

/// Lay out a host entry in `arena`.
///
/// # Errors
///
/// - `NotFound` when there is no `cn`, no `ipHostNumber`, or no address
///   value survives the family filter
/// - `BufferTooSmall` when the arena cannot hold the record; nothing is
///   returned and the caller should retry with a larger arena
pub fn parse_host<'a>(
    attrs: &HostAttributes,
    arena: &'a mut Arena<'_>,
    filter: FamilyFilter,
    options: &ResolverOptions,
) -> Result<HostEnt<'a>> {
    let Some(canonical) = attrs.cn.first() else {
        tracing::debug!("Host entry has no cn");
        return Err(WireError::NotFound);
    };

    // The canonical name seeds the set so it never reappears as an alias.
    let mut names = ValueSet::with_capacity(attrs.cn.len());
    names.extend(attrs.cn.iter().map(String::as_str));

    let name = arena.push_str(canonical)?;
    let aliases = arena.push_str_list(names.iter().skip(1))?;

    let count = attrs.ip_host_number.len();
    if count == 0 {
        tracing::debug!("Host {} has no ipHostNumber", canonical);
        return Err(WireError::NotFound);
    }

    let mut table = AddressTable::reserve(arena, count, filter.max_width(options))?;
    for value in &attrs.ip_host_number {
        match classify(value, filter, options) {
            Some(addr) => {
                table.push(arena, &addr);
            }
            None => tracing::debug!("Skipping address value {:?} for {}", value, canonical),
        }
    }
    let list = table.finish()?;

    let arena: &'a Arena<'_> = arena;
    Ok(HostEnt::new(arena.view(), name, aliases, list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::family::AddressFamily;
    use crate::hosts::record::address_table_need;
    use std::net::IpAddr;

    const PLAIN: ResolverOptions = ResolverOptions {
        map_ipv4_to_ipv6: false,
    };
    const MAPPED: ResolverOptions = ResolverOptions {
        map_ipv4_to_ipv6: true,
    };

    fn ips(values: &[&str]) -> Vec<IpAddr> {
        values.iter().map(|v| v.parse().unwrap()).collect()
    }

    #[test]
    fn test_malformed_address_skipped() {
        let attrs = HostAttributes::new(["host1"], ["10.0.0.1", "not-an-ip", "10.0.0.2"]);
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let ent = parse_host(&attrs, &mut arena, FamilyFilter::Inet, &PLAIN).unwrap();
        assert_eq!(ent.name(), "host1");
        assert_eq!(ent.aliases().count(), 0);
        assert_eq!(ent.family(), AddressFamily::Inet);
        assert_eq!(ent.length(), 4);
        assert_eq!(
            ent.addresses().collect::<Vec<_>>(),
            ips(&["10.0.0.1", "10.0.0.2"])
        );
    }

    #[test]
    fn test_aliases_deduplicated_first_casing_kept() {
        let attrs = HostAttributes::new(
            ["host1", "Alias", "HOST1", "ALIAS", "other"],
            ["10.0.0.1"],
        );
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let ent = parse_host(&attrs, &mut arena, FamilyFilter::Inet, &PLAIN).unwrap();
        assert_eq!(ent.aliases().collect::<Vec<_>>(), vec!["Alias", "other"]);
    }

    #[test]
    fn test_no_cn_is_not_found() {
        let attrs = HostAttributes::new(Vec::<String>::new(), ["10.0.0.1"]);
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let err = parse_host(&attrs, &mut arena, FamilyFilter::Inet, &PLAIN).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_no_addresses_is_not_found() {
        let attrs = HostAttributes::new(["host1", "alias"], Vec::<String>::new());
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let err =
            parse_host(&attrs, &mut arena, FamilyFilter::AnyPreferMapped, &PLAIN).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_all_garbage_is_not_found() {
        let attrs = HostAttributes::new(["host1"], ["bogus", "10.0.0", "::zz"]);
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let err =
            parse_host(&attrs, &mut arena, FamilyFilter::AnyPreferMapped, &PLAIN).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_mixed_family_ipv4_first() {
        let attrs = HostAttributes::new(["dual"], ["10.0.0.1", "::1"]);
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let ent = parse_host(&attrs, &mut arena, FamilyFilter::AnyPreferMapped, &PLAIN).unwrap();
        assert_eq!(ent.family(), AddressFamily::Inet);
        assert_eq!(ent.addresses().collect::<Vec<_>>(), ips(&["10.0.0.1"]));
    }

    #[test]
    fn test_mixed_family_ipv6_first() {
        let attrs = HostAttributes::new(["dual"], ["::1", "10.0.0.1"]);
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let ent = parse_host(&attrs, &mut arena, FamilyFilter::AnyPreferMapped, &PLAIN).unwrap();
        assert_eq!(ent.family(), AddressFamily::Inet6);
        assert_eq!(ent.length(), 16);
        assert_eq!(ent.addresses().collect::<Vec<_>>(), ips(&["::1"]));
    }

    #[test]
    fn test_mixed_family_with_mapping_keeps_both() {
        for order in [["10.0.0.1", "::1"], ["::1", "10.0.0.1"]] {
            let attrs = HostAttributes::new(["dual"], order);
            let mut buf = [0u8; 256];
            let mut arena = Arena::new(&mut buf);

            let ent =
                parse_host(&attrs, &mut arena, FamilyFilter::AnyPreferMapped, &MAPPED).unwrap();
            assert_eq!(ent.family(), AddressFamily::Inet6);
            assert_eq!(ent.address_count(), 2);
            assert!(ent
                .addresses()
                .any(|a| a == "::ffff:10.0.0.1".parse::<IpAddr>().unwrap()));
        }
    }

    #[test]
    fn test_inet6_filter_skips_ipv4() {
        let attrs = HostAttributes::new(["v6host"], ["10.0.0.1", "2001:db8::1"]);
        let mut buf = [0u8; 256];
        let mut arena = Arena::new(&mut buf);

        let ent = parse_host(&attrs, &mut arena, FamilyFilter::Inet6, &MAPPED).unwrap();
        assert_eq!(ent.addresses().collect::<Vec<_>>(), ips(&["2001:db8::1"]));
    }

    #[test]
    fn test_exact_arena_sizing() {
        let attrs = HostAttributes::new(["host1", "h1"], ["10.0.0.1", "10.0.0.2"]);

        let mut big = [0u8; 512];
        let used = {
            let mut arena = Arena::new(&mut big);
            parse_host(&attrs, &mut arena, FamilyFilter::Inet, &PLAIN).unwrap();
            arena.position()
        };

        let mut exact = vec![0u8; used];
        let mut arena = Arena::new(&mut exact);
        assert!(parse_host(&attrs, &mut arena, FamilyFilter::Inet, &PLAIN).is_ok());

        for capacity in 0..used {
            let mut short = vec![0u8; capacity];
            let mut arena = Arena::new(&mut short);
            let err = parse_host(&attrs, &mut arena, FamilyFilter::Inet, &PLAIN).unwrap_err();
            assert!(err.is_retryable(), "capacity {} gave {:?}", capacity, err);
        }
    }

    #[test]
    fn test_worst_case_need_matches_layout() {
        let attrs = HostAttributes::new(["h"], ["::1", "::2", "::3"]);
        let mut buf = [0u8; 512];
        let mut arena = Arena::new(&mut buf);

        // name "h\0" then an empty alias list (one sentinel slot, aligned)
        let prefix = crate::protocol::padding(2, crate::protocol::SLOT_SIZE)
            + 2
            + crate::protocol::SLOT_SIZE;
        parse_host(&attrs, &mut arena, FamilyFilter::Inet6, &PLAIN).unwrap();
        assert_eq!(arena.position(), prefix + address_table_need(prefix, 3, 16));
    }
}
