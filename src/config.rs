/*!

Reading a `Dragonfly` configuration object into the values the routing needs.

```ignore
Dragonfly
{
	hosts_per_router: 4,
	routers_per_group: 4,
	intergroup_per_router: 4,
	intergroup_links: 1,
	num_groups: 9,
	algorithm: ["minimal","valiant"],
	adaptive_threshold: 2.0,
	global_route_mode: "relative",
	link_slot_policy: SourceHash,
	seed: 42,
}
```

`global_link_map` may be given as an array of `A*H` integers, see [GlobalLinkMap]. `num_vns` defaults to the number of algorithms and `radix`, when present, is checked against the parameters.

*/

use std::fs::File;
use std::io::Read;
use std::path::Path;
use log::{debug,warn};
use crate::config_parser::{self,ConfigurationValue,Token};
use crate::topology::dragonfly::{Dragonfly,DragonflyParameters,GlobalLinkMap,GlobalRouteMode};
use crate::routing::{LinkSlotPolicy,RouteAlgorithm};
use crate::routing::table::RouteToGroup;
use crate::routing::virtual_network::VirtualNetworkRegistry;
use crate::error::Error;
use crate::error;

///Iterate over the fields of a configuration object, failing with `IllFormedConfiguration` on a wrong object name or an unknown field.
///The field `legend_name` is always accepted and ignored.
///```ignore
///match_object!(cv,"Fixed",value,
///	"slot" => slot=value.as_usize()?,
///);
///```
#[macro_export]
macro_rules! match_object{
	($cv:expr, $name:literal, $valueid:ident, $($key:literal => $arm:expr),* $(,)?) => {{
		if let &$crate::config_parser::ConfigurationValue::Object(ref cv_name, ref cv_pairs)=$cv
		{
			if cv_name!=$name
			{
				return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("A {} must be created from a `{}` object not `{}`",$name,$name,cv_name)));
			}
			for &(ref name,ref $valueid) in cv_pairs
			{
				match name.as_ref()
				{
					$( $key => $arm, )*
					"legend_name" => (),
					_ => return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Nothing to do with field {} in {}",name,$name))),
				}
			}
		}
		else
		{
			return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Trying to create a {} from a non-Object",$name)));
		}
	}};
}

///Everything that describes the routing of a dragonfly. Shared by all its routers.
#[derive(Clone,Debug)]
pub struct DragonflyConfiguration
{
	pub parameters: DragonflyParameters,
	pub num_vns: usize,
	///One per virtual network, or a single one for all of them.
	pub algorithms: Vec<RouteAlgorithm>,
	///Adaptive routing diverts when the minimal cost exceeds this times the Valiant cost.
	pub adaptive_threshold: f64,
	pub global_link_map: GlobalLinkMap,
	pub global_route_mode: GlobalRouteMode,
	pub link_slot_policy: LinkSlotPolicy,
	///Each router seeds its generator with this plus its index.
	pub seed: u64,
}

impl DragonflyConfiguration
{
	pub fn new(cv:&ConfigurationValue) -> Result<DragonflyConfiguration,Error>
	{
		let mut hosts_per_router=None;
		let mut routers_per_group=None;
		let mut intergroup_per_router=None;
		let mut intergroup_links=1;
		let mut num_groups=None;
		let mut algorithms=vec![];
		let mut num_vns=None;
		let mut adaptive_threshold=2.0;
		let mut global_link_map=None;
		let mut global_route_mode=GlobalRouteMode::Relative;
		let mut link_slot_policy=LinkSlotPolicy::default();
		let mut seed=0;
		let mut radix=None;
		match_object!(cv,"Dragonfly",value,
			"hosts_per_router" => hosts_per_router=Some(value.as_usize()?),
			"routers_per_group" => routers_per_group=Some(value.as_usize()?),
			"intergroup_per_router" => intergroup_per_router=Some(value.as_usize()?),
			"intergroup_links" => intergroup_links=value.as_usize()?,
			"num_groups" => num_groups=Some(value.as_usize()?),
			"algorithm" => algorithms=match value
			{
				&ConfigurationValue::Array(ref list) => list.iter().map(RouteAlgorithm::from_configuration).collect::<Result<Vec<_>,Error>>()?,
				_ => vec![RouteAlgorithm::from_configuration(value)?],
			},
			"num_vns" => num_vns=Some(value.as_usize()?),
			"adaptive_threshold" => adaptive_threshold=value.as_f64()?,
			"global_link_map" => global_link_map=Some(value.as_array()?.iter().map(|v|v.as_i64()).collect::<Result<Vec<i64>,Error>>()?),
			"global_route_mode" => global_route_mode=GlobalRouteMode::from_name(value.as_str()?)?,
			"link_slot_policy" => link_slot_policy=LinkSlotPolicy::from_configuration(value)?,
			"seed" => seed=value.as_usize()? as u64,
			"radix" => radix=Some(value.as_usize()?),
		);
		let missing = |field:&str| error!(ill_formed_configuration,cv.clone()).with_message(format!("There were no {}",field));
		let hosts_per_router=hosts_per_router.ok_or_else(||missing("hosts_per_router"))?;
		let routers_per_group=routers_per_group.ok_or_else(||missing("routers_per_group"))?;
		let intergroup_per_router=intergroup_per_router.ok_or_else(||missing("intergroup_per_router"))?;
		let num_groups=num_groups.ok_or_else(||missing("num_groups"))?;
		let parameters = DragonflyParameters::new(hosts_per_router,routers_per_group,intergroup_per_router,num_groups,intergroup_links)?;
		if let Some(radix) = radix
		{
			parameters.check_radix(radix)?;
		}
		if algorithms.is_empty()
		{
			return Err(error!(missing_routing_algorithm,0));
		}
		let num_vns = num_vns.unwrap_or(algorithms.len());
		if !(adaptive_threshold > 0.0)
		{
			return Err(error!(ill_formed_configuration,ConfigurationValue::Number(adaptive_threshold)).with_message("adaptive_threshold must be positive".to_string()));
		}
		if adaptive_threshold < 1.0
		{
			warn!("adaptive_threshold={} favours Valiant over minimal paths",adaptive_threshold);
		}
		if let LinkSlotPolicy::Fixed{slot} = link_slot_policy
		{
			if slot >= intergroup_links
			{
				return Err(error!(inconsistent_parameters).with_message(format!("fixed slot {} but only {} links join each pair of groups",slot,intergroup_links)));
			}
			if intergroup_links>1
			{
				warn!("only slot {} of the {} parallel global links will be used",slot,intergroup_links);
			}
		}
		let global_link_map = match global_link_map
		{
			Some(entries) => GlobalLinkMap::new(&parameters,entries)?,
			None => GlobalLinkMap::default_for(&parameters)?,
		};
		let configuration = DragonflyConfiguration{
			parameters,
			num_vns,
			algorithms,
			adaptive_threshold,
			global_link_map,
			global_route_mode,
			link_slot_policy,
			seed,
		};
		//Reject bad networks now rather than at the first packet.
		configuration.virtual_networks()?;
		debug!("dragonfly configuration {:?}",configuration);
		Ok(configuration)
	}
	///Read a file with a single `Dragonfly` object.
	pub fn from_file(path:&Path) -> Result<DragonflyConfiguration,Error>
	{
		let mut file = File::open(path).map_err(|e|error!(could_not_open_file,path.to_path_buf(),e))?;
		let mut contents = String::new();
		file.read_to_string(&mut contents).map_err(|e|error!(could_not_open_file,path.to_path_buf(),e))?;
		match config_parser::parse(&contents)
		{
			Ok(Token::Value(ref value)) => DragonflyConfiguration::new(value),
			Ok(_) => Err(error!(could_not_parse_file,path.to_path_buf())),
			Err(x) => Err(error!(could_not_parse_file,path.to_path_buf()).with_message(format!("error parsing configuration file: {:?}",x))),
		}
	}
	pub fn virtual_networks(&self) -> Result<VirtualNetworkRegistry,Error>
	{
		VirtualNetworkRegistry::new(self.num_vns,&self.algorithms)
	}
	///Build the group table to be shared by every router of the process.
	pub fn route_table(&self) -> Result<RouteToGroup,Error>
	{
		RouteToGroup::build(&self.parameters,&self.global_link_map)
	}
	///The wiring of the whole network, over an already built table.
	pub fn topology(&self, table:RouteToGroup) -> Result<Dragonfly,Error>
	{
		Dragonfly::new(self.parameters,self.global_route_mode,table,&self.global_link_map)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;

	fn parse(text:&str) -> ConfigurationValue
	{
		match config_parser::parse(text)
		{
			Ok(Token::Value(value)) => value,
			other => panic!("could not parse {}: {:?}",text,other),
		}
	}

	#[test]
	fn full_configuration()
	{
		let cv = parse("Dragonfly{hosts_per_router:4, routers_per_group:4, intergroup_per_router:4, num_groups:9, algorithm:[\"minimal\",\"valiant\",AdaptiveLocal], adaptive_threshold:3.5, global_route_mode:\"absolute\", link_slot_policy:RoundRobin, seed:7, radix:11, legend_name:\"example\"}");
		let configuration = DragonflyConfiguration::new(&cv).expect("valid configuration");
		assert_eq!(configuration.parameters,DragonflyParameters::new(4,4,4,9,1).expect("valid parameters"));
		assert_eq!(configuration.algorithms,vec![RouteAlgorithm::Minimal,RouteAlgorithm::Valiant,RouteAlgorithm::AdaptiveLocal]);
		assert_eq!(configuration.num_vns,3);
		assert_eq!(configuration.adaptive_threshold,3.5);
		assert_eq!(configuration.global_route_mode,GlobalRouteMode::Absolute);
		assert_eq!(configuration.link_slot_policy,LinkSlotPolicy::RoundRobin);
		assert_eq!(configuration.seed,7);
		assert_eq!(configuration.virtual_networks().expect("valid").total_virtual_channels(),8);
		let table = configuration.route_table().expect("complete table");
		configuration.topology(table).expect("consistent wiring");
	}

	#[test]
	fn defaults_and_explicit_map()
	{
		let cv = parse("Dragonfly{hosts_per_router:1, routers_per_group:2, intergroup_per_router:2, num_groups:4, algorithm:\"valiant\", num_vns:2, global_link_map:[2,0,1,-1]}");
		let configuration = DragonflyConfiguration::new(&cv).expect("valid configuration");
		assert_eq!(configuration.adaptive_threshold,2.0);
		assert_eq!(configuration.global_route_mode,GlobalRouteMode::Relative);
		assert_eq!(configuration.link_slot_policy,LinkSlotPolicy::SourceHash);
		assert_eq!(configuration.global_link_map.entries().to_vec(),vec![2,0,1,-1]);
		assert_eq!(configuration.virtual_networks().expect("valid").len(),2);
	}

	#[test]
	fn rejected_configurations()
	{
		let base = "hosts_per_router:4, routers_per_group:4, intergroup_per_router:4, num_groups:9";
		let fails = |fields:&str| DragonflyConfiguration::new(&parse(&format!("Dragonfly{{{}}}",fields))).unwrap_err().kind;
		assert!(matches!(fails(&format!("{}, algorithm:\"minimal\", radix:12",base)),ErrorKind::InconsistentParameters));
		assert!(matches!(fails(base),ErrorKind::MissingRoutingAlgorithm{virtual_network:0}));
		assert!(matches!(fails(&format!("{}, algorithm:[\"minimal\",\"valiant\"], num_vns:3",base)),ErrorKind::MissingRoutingAlgorithm{virtual_network:2}));
		assert!(matches!(fails(&format!("{}, algorithm:\"ugal\"",base)),ErrorKind::UnknownRoutingAlgorithm{..}));
		assert!(matches!(fails(&format!("{}, algorithm:\"minimal\", colour:3",base)),ErrorKind::IllFormedConfiguration{..}));
		assert!(matches!(fails(&format!("{}, algorithm:\"minimal\", global_route_mode:\"sideways\"",base)),ErrorKind::IllFormedConfiguration{..}));
		assert!(matches!(fails(&format!("{}, algorithm:\"minimal\", link_slot_policy:Fixed{{slot:1}}",base)),ErrorKind::InconsistentParameters));
		assert!(matches!(fails(&format!("{}, algorithm:\"minimal\", global_link_map:[0,1]",base)),ErrorKind::InconsistentParameters));
		assert!(matches!(fails("hosts_per_router:4, algorithm:\"minimal\""),ErrorKind::IllFormedConfiguration{..}));
		assert!(matches!(DragonflyConfiguration::new(&parse("Torus{sides:[4,4]}")).unwrap_err().kind,ErrorKind::IllFormedConfiguration{..}));
	}

	#[test]
	fn missing_file()
	{
		let error = DragonflyConfiguration::from_file(Path::new("/nonexistent/dragonfly.cfg")).unwrap_err();
		assert!(matches!(error.kind,ErrorKind::CouldNotOpenFile{..}));
	}
}
