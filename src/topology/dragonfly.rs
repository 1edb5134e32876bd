/*!

Address translation and physical wiring of a dragonfly with arbitrary dimensions.

A router has `P` ports to hosts, `A-1` ports to the other routers of its group and `H` global ports to other groups, always in this order:

* ports `[0,P)` go to hosts,
* ports `[P,P+A-1)` go to the sibling routers, skipping the router itself,
* ports `[P+A-1,P+A-1+H)` are global.

Endpoints are numbered `(group*A+router)*P+host`, and routers `group*A+router`.

The global links are described by a [GlobalLinkMap] shared by every group. Entry `router*H+i` tells which row and slot of the group table is served by global port `i` of the routers at position `router`. How a row names a remote group depends on the [GlobalRouteMode].

*/

use std::fmt::{Display,Formatter};
use std::ops::Range;
use log::{debug,warn};
use serde::{Serialize,Deserialize};
use quantifiable_derive::Quantifiable;//the derive macro
use super::{Topology,Location};
use crate::matrix::Matrix;
use crate::routing::table::RouteToGroup;
use crate::error::Error;
use crate::error;

///Link class of the wires between routers of the same group.
pub const LOCAL_LINK_CLASS: usize = 0;
///Link class of the wires between groups.
pub const GLOBAL_LINK_CLASS: usize = 1;
///Link class of the wires to hosts.
pub const SERVER_LINK_CLASS: usize = 2;

///The structural parameters of the network. Dally calls them `p`, `a`, `h` and `g`.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Quantifiable)]
pub struct DragonflyParameters
{
	/// `P`. Hosts attached to each router.
	pub hosts_per_router: usize,
	/// `A`. Routers in a group, all of them joined by local links.
	pub routers_per_group: usize,
	/// `H`. Global ports in each router.
	pub global_ports_per_router: usize,
	/// `G`.
	pub num_groups: usize,
	/// `N`. Parallel global links joining each pair of groups.
	pub links_per_group_pair: usize,
}

impl DragonflyParameters
{
	pub fn new(hosts_per_router:usize, routers_per_group:usize, global_ports_per_router:usize, num_groups:usize, links_per_group_pair:usize) -> Result<DragonflyParameters,Error>
	{
		let parameters = DragonflyParameters{
			hosts_per_router,
			routers_per_group,
			global_ports_per_router,
			num_groups,
			links_per_group_pair,
		};
		if hosts_per_router==0 || routers_per_group==0 || num_groups==0 || links_per_group_pair==0
		{
			return Err(error!(inconsistent_parameters).with_message(format!("zero-sized dimension in {:?}",parameters)));
		}
		let needed = parameters.table_rows()*links_per_group_pair;
		let available = routers_per_group*global_ports_per_router;
		if needed > available
		{
			return Err(error!(inconsistent_parameters).with_message(format!("{} groups with {} links per pair need {} global ports per group, but groups only have {}",num_groups,links_per_group_pair,needed,available)));
		}
		Ok(parameters)
	}
	///`K=P+(A-1)+H`
	pub fn radix(&self) -> usize
	{
		self.hosts_per_router + self.routers_per_group-1 + self.global_ports_per_router
	}
	///Fails unless `radix` equals the sum of the three port classes.
	pub fn check_radix(&self, radix:usize) -> Result<(),Error>
	{
		if radix != self.radix()
		{
			return Err(error!(inconsistent_parameters).with_message(format!("a router of radix {} cannot hold {} host ports, {} local ports and {} global ports",radix,self.hosts_per_router,self.routers_per_group-1,self.global_ports_per_router)));
		}
		Ok(())
	}
	pub fn num_routers(&self) -> usize
	{
		self.routers_per_group*self.num_groups
	}
	pub fn num_endpoints(&self) -> usize
	{
		self.hosts_per_router*self.routers_per_group*self.num_groups
	}
	///Rows of the group table for each slot. Each row is a group other than the current one.
	pub fn table_rows(&self) -> usize
	{
		self.num_groups-1
	}
	pub fn host_ports(&self) -> Range<usize>
	{
		0..self.hosts_per_router
	}
	pub fn intra_group_ports(&self) -> Range<usize>
	{
		self.hosts_per_router..self.hosts_per_router+self.routers_per_group-1
	}
	pub fn global_ports(&self) -> Range<usize>
	{
		let start = self.hosts_per_router+self.routers_per_group-1;
		start..start+self.global_ports_per_router
	}
	///The port number of the `index`-th global port.
	pub fn global_port(&self, index:usize) -> usize
	{
		self.hosts_per_router+self.routers_per_group-1+index
	}
	pub fn port_class(&self, port:usize) -> Result<PortClass,Error>
	{
		if self.host_ports().contains(&port)
		{
			Ok(PortClass::Host)
		}
		else if self.intra_group_ports().contains(&port)
		{
			Ok(PortClass::Group)
		}
		else if self.global_ports().contains(&port)
		{
			Ok(PortClass::Global)
		}
		else
		{
			Err(error!(port_out_of_range,port,self.radix()))
		}
	}
	///Hierarchical address of an endpoint. The Valiant fields are left pointing to its own group.
	pub fn locate(&self, id:usize) -> Result<DragonflyAddress,Error>
	{
		let limit = self.num_endpoints();
		if id >= limit
		{
			return Err(error!(endpoint_out_of_range,id,limit));
		}
		let host = id % self.hosts_per_router;
		let router = (id / self.hosts_per_router) % self.routers_per_group;
		let group = id / (self.hosts_per_router*self.routers_per_group);
		Ok(DragonflyAddress{
			group: group as u32,
			mid_group: group as u32,
			mid_group_shadow: group as u32,
			router: router as u32,
			host: host as u32,
		})
	}
	///Inverse of `locate`.
	pub fn endpoint_id(&self, group:usize, router:usize, host:usize) -> Result<usize,Error>
	{
		if group>=self.num_groups || router>=self.routers_per_group || host>=self.hosts_per_router
		{
			return Err(error!(endpoint_out_of_range,(group*self.routers_per_group+router)*self.hosts_per_router+host,self.num_endpoints())
				.with_message(format!("no endpoint at group {} router {} host {}",group,router,host)));
		}
		Ok( (group*self.routers_per_group+router)*self.hosts_per_router+host )
	}
	pub fn group_of(&self, router_index:usize) -> usize
	{
		router_index/self.routers_per_group
	}
	///Position of a router inside its group.
	pub fn router_in_group(&self, router_index:usize) -> usize
	{
		router_index%self.routers_per_group
	}
	pub fn router_index(&self, group:usize, router:usize) -> usize
	{
		group*self.routers_per_group+router
	}
	///The local port of router `current` that leads to its sibling `target`. They must be different.
	pub fn port_for_router(&self, current:usize, target:usize) -> usize
	{
		debug_assert_ne!(current,target,"a router has no port to itself");
		if target > current
		{
			self.hosts_per_router + target - 1
		}
		else
		{
			self.hosts_per_router + target
		}
	}
	///The sibling reached from local port `port` of router `current`.
	pub fn router_for_port(&self, current:usize, port:usize) -> usize
	{
		let offset = port - self.hosts_per_router;
		if offset >= current { offset + 1 } else { offset }
	}
}

///The three kinds of ports of a router.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum PortClass
{
	Host,
	Group,
	Global,
}

impl Display for PortClass
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		let name = match self
		{
			PortClass::Host => "host",
			PortClass::Group => "group",
			PortClass::Global => "global",
		};
		write!(formatter,"{}",name)
	}
}

///Where a packet is going. `mid_group` is the group currently being targeted, which differs from `group` only during the first phase of a Valiant path.
///`mid_group_shadow` keeps the intermediate group selected for the packet even after the first phase ends.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize,Quantifiable)]
pub struct DragonflyAddress
{
	pub group: u32,
	pub mid_group: u32,
	pub mid_group_shadow: u32,
	pub router: u32,
	pub host: u32,
}

impl DragonflyAddress
{
	///The address of initialization data sent to everybody.
	pub fn broadcast() -> DragonflyAddress
	{
		DragonflyAddress{
			group: u32::MAX,
			mid_group: u32::MAX,
			mid_group_shadow: u32::MAX,
			router: u32::MAX,
			host: u32::MAX,
		}
	}
	pub fn is_broadcast(&self) -> bool
	{
		self.group == u32::MAX
	}
}

///How the rows of the group table name the remote groups.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Quantifiable)]
pub enum GlobalRouteMode
{
	///Row `i` is the `i`-th group in increasing order, skipping the current one.
	Absolute,
	///Row `i` is the group `i+1` positions after the current one, modulo `G`.
	Relative,
}

impl GlobalRouteMode
{
	pub fn from_name(name:&str) -> Result<GlobalRouteMode,Error>
	{
		match name
		{
			"absolute" => Ok(GlobalRouteMode::Absolute),
			"relative" => Ok(GlobalRouteMode::Relative),
			_ => Err(error!(ill_formed_configuration,crate::config_parser::ConfigurationValue::Literal(name.to_string()))
				.with_message("global_route_mode must be \"absolute\" or \"relative\"".to_string())),
		}
	}
	///The table row that router in group `current` uses to reach group `target`. They must be different.
	pub fn row_of_group(&self, current:usize, target:usize, num_groups:usize) -> usize
	{
		debug_assert_ne!(current,target,"there is no table row for the own group");
		match self
		{
			GlobalRouteMode::Absolute => if target > current { target-1 } else { target },
			GlobalRouteMode::Relative => (target + num_groups - current) % num_groups - 1,
		}
	}
	///Inverse of `row_of_group`.
	pub fn group_of_row(&self, current:usize, row:usize, num_groups:usize) -> usize
	{
		match self
		{
			GlobalRouteMode::Absolute => if row >= current { row+1 } else { row },
			GlobalRouteMode::Relative => (current + row + 1) % num_groups,
		}
	}
}

impl Display for GlobalRouteMode
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		match self
		{
			GlobalRouteMode::Absolute => write!(formatter,"absolute"),
			GlobalRouteMode::Relative => write!(formatter,"relative"),
		}
	}
}

///Which table entry each global port serves. Value `-1` marks an unconnected port; otherwise the value is `slot*(G-1)+row`.
#[derive(Clone,Debug,PartialEq)]
pub struct GlobalLinkMap
{
	entries: Vec<i64>,
}

impl GlobalLinkMap
{
	pub fn new(parameters:&DragonflyParameters, entries:Vec<i64>) -> Result<GlobalLinkMap,Error>
	{
		let expected = parameters.routers_per_group*parameters.global_ports_per_router;
		if entries.len() != expected
		{
			return Err(error!(inconsistent_parameters).with_message(format!("global_link_map has {} entries instead of {}",entries.len(),expected)));
		}
		let limit = (parameters.table_rows()*parameters.links_per_group_pair) as i64;
		if let Some((index,value)) = entries.iter().enumerate().find(|(_,&value)| value < -1 || value >= limit)
		{
			return Err(error!(inconsistent_parameters).with_message(format!("global_link_map[{}]={} is not in [-1,{})",index,value,limit)));
		}
		let unused = entries.iter().filter(|&&value|value==-1).count();
		if unused>0
		{
			warn!("{} global ports per group are left unconnected",unused);
		}
		Ok(GlobalLinkMap{entries})
	}
	///Spread the links in order, `ceil(N*(G-1)/A)` per router.
	pub fn default_for(parameters:&DragonflyParameters) -> Result<GlobalLinkMap,Error>
	{
		let h = parameters.global_ports_per_router;
		let a = parameters.routers_per_group;
		let links = parameters.table_rows()*parameters.links_per_group_pair;
		let mut entries = vec![-1;a*h];
		if links>0
		{
			let per_router = (links + a - 1)/a;
			if per_router > h
			{
				return Err(error!(inconsistent_parameters).with_message(format!("{} global links per router are required but only {} global ports exist",per_router,h)));
			}
			for link in 0..links
			{
				entries[(link/per_router)*h + link%per_router] = link as i64;
			}
		}
		debug!("generated default global link map {:?}",entries);
		GlobalLinkMap::new(parameters,entries)
	}
	pub fn entries(&self) -> &[i64]
	{
		&self.entries
	}
	///The `(row,slot)` served by the `index`-th global port of the routers at position `router`.
	pub fn link(&self, parameters:&DragonflyParameters, router:usize, index:usize) -> Option<(usize,usize)>
	{
		let value = self.entries[router*parameters.global_ports_per_router+index];
		if value < 0
		{
			return None;
		}
		let rows = parameters.table_rows();
		let value = value as usize;
		Some((value%rows,value/rows))
	}
}

///The whole network, built from the same table the routers use.
///It allows following a port to the router at the other side.
#[derive(Debug,Quantifiable)]
pub struct Dragonfly
{
	parameters: DragonflyParameters,
	mode: GlobalRouteMode,
	table: RouteToGroup,
	///For each position in the group and each global port, the `(row,slot)` it serves.
	link_of_port: Vec<Option<(usize,usize)>>,
}

impl Dragonfly
{
	///Fails with `InconsistentWiring` when some global link does not pair with a link in the opposite direction.
	pub fn new(parameters:DragonflyParameters, mode:GlobalRouteMode, table:RouteToGroup, map:&GlobalLinkMap) -> Result<Dragonfly,Error>
	{
		let mut link_of_port = Vec::with_capacity(parameters.routers_per_group*parameters.global_ports_per_router);
		for router in 0..parameters.routers_per_group
		{
			for index in 0..parameters.global_ports_per_router
			{
				link_of_port.push(map.link(&parameters,router,index));
			}
		}
		let topology = Dragonfly{
			parameters,
			mode,
			table,
			link_of_port,
		};
		topology.check_adjacency_consistency(Some(3))?;
		debug!("dragonfly with {} routers and {} servers in {} mode",topology.num_routers(),topology.num_servers(),mode);
		Ok(topology)
	}
	pub fn parameters(&self) -> &DragonflyParameters
	{
		&self.parameters
	}
	///`result.get(i,j)` is the number of global links joining groups `i` and `j`.
	pub fn global_trunking_distribution(&self) -> Matrix<usize>
	{
		let g = self.parameters.num_groups;
		let mut result = Matrix::constant(0,g,g);
		for router_index in 0..self.num_routers()
		{
			for port in self.parameters.global_ports()
			{
				if let (Location::RouterPort{router_index:target,..},_) = self.neighbour(router_index,port)
				{
					*result.get_mut(self.parameters.group_of(router_index),self.parameters.group_of(target)) += 1;
				}
			}
		}
		result
	}
}

impl Topology for Dragonfly
{
	fn num_routers(&self) -> usize
	{
		self.parameters.num_routers()
	}
	fn num_servers(&self) -> usize
	{
		self.parameters.num_endpoints()
	}
	fn neighbour(&self, router_index:usize, port:usize) -> (Location,usize)
	{
		let p = &self.parameters;
		let group = p.group_of(router_index);
		let router = p.router_in_group(router_index);
		if p.host_ports().contains(&port)
		{
			(Location::ServerPort(router_index*p.hosts_per_router+port),SERVER_LINK_CLASS)
		}
		else if p.intra_group_ports().contains(&port)
		{
			let target = p.router_for_port(router,port);
			(Location::RouterPort{router_index:p.router_index(group,target),router_port:p.port_for_router(target,router)},LOCAL_LINK_CLASS)
		}
		else if p.global_ports().contains(&port)
		{
			let index = port - p.global_port(0);
			match self.link_of_port[router*p.global_ports_per_router+index]
			{
				None => (Location::None,GLOBAL_LINK_CLASS),
				Some((row,slot)) =>
				{
					let target_group = self.mode.group_of_row(group,row,p.num_groups);
					let back_row = self.mode.row_of_group(target_group,group,p.num_groups);
					match self.table.lookup(back_row,slot)
					{
						Ok(pair) => (Location::RouterPort{router_index:p.router_index(target_group,pair.router as usize),router_port:pair.port as usize},GLOBAL_LINK_CLASS),
						Err(_) => (Location::None,GLOBAL_LINK_CLASS),
					}
				}
			}
		}
		else
		{
			(Location::None,LOCAL_LINK_CLASS)
		}
	}
	fn server_neighbour(&self, server_index:usize) -> (Location,usize)
	{
		let p = &self.parameters;
		(Location::RouterPort{
			router_index: server_index/p.hosts_per_router,
			router_port: server_index%p.hosts_per_router,
		},SERVER_LINK_CLASS)
	}
	fn degree(&self, _router_index: usize) -> usize
	{
		self.parameters.routers_per_group-1 + self.parameters.global_ports_per_router
	}
	fn ports(&self, _router_index: usize) -> usize
	{
		self.parameters.radix()
	}
}
