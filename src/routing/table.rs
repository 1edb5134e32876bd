/*!

The group routing table: for each remote group and parallel link, the router of the current group that owns the global link and the port it uses.

The table is the same for every group, so a single store is shared by all the router instances of the process. It is filled with a [RouteToGroupBuilder] during initialization and then frozen behind an `Arc`. Each router keeps a [RouteToGroup] view bound to that store, that can only read.

Rows are not groups but positions relative to the current group, see [GlobalRouteMode](crate::topology::dragonfly::GlobalRouteMode).

*/

use std::sync::Arc;
use quantifiable_derive::Quantifiable;//the derive macro
use crate::matrix::Matrix;
use crate::topology::dragonfly::{DragonflyParameters,GlobalLinkMap};
use crate::error::Error;
use crate::error;

///A router inside the group and one of its global ports.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Quantifiable)]
pub struct RouterPortPair
{
	pub router: u16,
	pub port: u16,
}

impl RouterPortPair
{
	pub fn new(router:usize, port:usize) -> RouterPortPair
	{
		RouterPortPair{
			router: router as u16,
			port: port as u16,
		}
	}
}

///The frozen contents of a table. Rows are table rows, columns are link slots.
pub type GroupTableStorage = Arc<Matrix<Option<RouterPortPair>>>;

///Mutable table, only used while building.
#[derive(Debug)]
pub struct RouteToGroupBuilder
{
	data: Matrix<Option<RouterPortPair>>,
}

impl RouteToGroupBuilder
{
	pub fn new(groups:usize, routes:usize) -> RouteToGroupBuilder
	{
		RouteToGroupBuilder{
			data: Matrix::constant(None,groups,routes),
		}
	}
	///Fill the table from a global link map. Each `(row,slot)` must be served by exactly one global port.
	pub fn from_link_map(parameters:&DragonflyParameters, map:&GlobalLinkMap) -> Result<RouteToGroupBuilder,Error>
	{
		let mut builder = RouteToGroupBuilder::new(parameters.table_rows(),parameters.links_per_group_pair);
		for router in 0..parameters.routers_per_group
		{
			for index in 0..parameters.global_ports_per_router
			{
				if let Some((row,slot)) = map.link(parameters,router,index)
				{
					builder.set(row,slot,RouterPortPair::new(router,parameters.global_port(index)))?;
				}
			}
		}
		Ok(builder)
	}
	///Write an entry. Writing twice the same entry means two ports claim the same link.
	pub fn set(&mut self, group:usize, route:usize, pair:RouterPortPair) -> Result<(),Error>
	{
		let (groups,routes) = (self.data.get_rows(),self.data.get_columns());
		let entry = self.data.try_get_mut(group,route).ok_or_else(||error!(group_table_index_out_of_range,group,route,groups,routes))?;
		if let Some(previous) = entry
		{
			return Err(error!(inconsistent_wiring).with_message(format!("table row {} slot {} is served by both {:?} and {:?}",group,route,previous,pair)));
		}
		*entry = Some(pair);
		Ok(())
	}
	///Freeze the table. Every entry must have been written.
	pub fn finish(self) -> Result<GroupTableStorage,Error>
	{
		for group in 0..self.data.get_rows()
		{
			for route in 0..self.data.get_columns()
			{
				if self.data.get(group,route).is_none()
				{
					return Err(error!(unreachable_group,group,route).with_message("the global link map leaves a remote group without link".to_string()));
				}
			}
		}
		Ok(Arc::new(self.data))
	}
}

///Read-only view of a shared table.
#[derive(Clone,Debug,Default,Quantifiable)]
pub struct RouteToGroup
{
	data: Option<GroupTableStorage>,
	groups: usize,
	routes: usize,
}

impl RouteToGroup
{
	///An unbound view. Any lookup fails until `init` is called.
	pub fn new() -> RouteToGroup
	{
		RouteToGroup::default()
	}
	///Bind to a frozen store of `groups` rows and `routes` slots. It can only be done once.
	pub fn init(&mut self, storage:GroupTableStorage, groups:usize, routes:usize) -> Result<(),Error>
	{
		if self.data.is_some()
		{
			return Err(error!(table_already_initialized));
		}
		if storage.get_rows()!=groups || storage.get_columns()!=routes
		{
			return Err(error!(inconsistent_parameters).with_message(format!("a table of {}x{} entries cannot be used as {}x{}",storage.get_rows(),storage.get_columns(),groups,routes)));
		}
		self.data = Some(storage);
		self.groups = groups;
		self.routes = routes;
		Ok(())
	}
	///Convenience to build, freeze and bind in one go.
	pub fn build(parameters:&DragonflyParameters, map:&GlobalLinkMap) -> Result<RouteToGroup,Error>
	{
		let storage = RouteToGroupBuilder::from_link_map(parameters,map)?.finish()?;
		let mut table = RouteToGroup::new();
		table.init(storage,parameters.table_rows(),parameters.links_per_group_pair)?;
		Ok(table)
	}
	pub fn lookup(&self, group:usize, route:usize) -> Result<RouterPortPair,Error>
	{
		let data = self.data.as_ref().ok_or_else(||error!(table_not_initialized))?;
		if group>=self.groups || route>=self.routes
		{
			return Err(error!(group_table_index_out_of_range,group,route,self.groups,self.routes));
		}
		(*data.get(group,route)).ok_or_else(||error!(unreachable_group,group,route))
	}
	pub fn groups(&self) -> usize
	{
		self.groups
	}
	pub fn routes(&self) -> usize
	{
		self.routes
	}
	///Whether `port` of the routers at position `router` appears in the table.
	pub fn is_used(&self, router:usize, port:usize) -> bool
	{
		let pair = RouterPortPair::new(router,port);
		match self.data
		{
			None => false,
			Some(ref data) => (0..self.groups).any(|group| (0..self.routes).any(|route| *data.get(group,route)==Some(pair))),
		}
	}
}
