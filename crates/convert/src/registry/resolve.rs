//! Fuzzy resolution over the type hierarchy.

use tracing::{trace, warn};

use super::ConverterRegistry;
use crate::converter::Converter;
use crate::types::TypeInfo;

impl ConverterRegistry {
	/// Looks for a converter along the hierarchy of the pair.
	///
	/// The source chain is tried first in walk order, starting with `source`
	/// itself, and the converter is wrapped so it projects the value onto the
	/// matched ancestor. When that misses and destination walking is enabled,
	/// converters stored for `source` against an ancestor of `destination`
	/// are accepted if they are marked up-cast capable.
	///
	/// Rules are not consulted; see [`ConverterRegistry::resolve`] for the
	/// full order.
	pub fn get_fuzzy(&self, source: &'static TypeInfo, destination: &'static TypeInfo) -> Option<Converter> {
		if self.config.diagnose_ambiguity {
			let candidates = self.fuzzy_candidates(source, destination);
			if candidates.len() > 1 {
				warn!(
					source = source.name(),
					destination = destination.name(),
					candidates = ?candidates.iter().map(Converter::label).collect::<Vec<_>>(),
					chosen = candidates[0].label(),
					"ambiguous fuzzy conversion",
				);
			}
			return candidates.into_iter().next();
		}
		self.source_walk(source, destination)
			.next()
			.or_else(|| self.destination_walk(source, destination).next())
	}

	/// Every distinct fuzzy candidate, first match first.
	pub(super) fn fuzzy_candidates(
		&self,
		source: &'static TypeInfo,
		destination: &'static TypeInfo,
	) -> Vec<Converter> {
		let mut out: Vec<Converter> = Vec::new();
		for converter in self
			.source_walk(source, destination)
			.chain(self.destination_walk(source, destination))
		{
			if !out.contains(&converter) {
				out.push(converter);
			}
		}
		out
	}

	fn source_walk(
		&self,
		source: &'static TypeInfo,
		destination: &'static TypeInfo,
	) -> impl Iterator<Item = Converter> + '_ {
		let chain = self.walker.ancestors(source);
		(0..chain.len()).filter_map(move |i| {
			let ancestor = &chain[i];
			if ancestor.info == destination {
				return None;
			}
			let found = self.exact.get(ancestor.info, destination)?;
			trace!(
				source = source.name(),
				destination = destination.name(),
				via = ancestor.info.name(),
				"fuzzy match on source ancestor",
			);
			Some(found.via(ancestor))
		})
	}

	fn destination_walk(
		&self,
		source: &'static TypeInfo,
		destination: &'static TypeInfo,
	) -> impl Iterator<Item = Converter> + '_ {
		let chain = if self.config.walk_destination_hierarchy {
			Some(self.walker.ancestors(destination))
		} else {
			None
		};
		// Index 0 is the pair itself, already covered by the source walk.
		chain.into_iter().flat_map(move |chain| {
			(1..chain.len()).filter_map(move |i| {
				let ancestor = chain[i].info;
				let found = self.exact.get(source, ancestor)?;
				if !found.is_upcast_capable() {
					return None;
				}
				trace!(
					source = source.name(),
					destination = destination.name(),
					via = ancestor.name(),
					"fuzzy match on destination ancestor",
				);
				Some(found)
			})
		})
	}
}
