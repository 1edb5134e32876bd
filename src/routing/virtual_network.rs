/*!

Virtual networks split the virtual channels of every port among traffic classes. Each network owns a contiguous range of channels and a routing algorithm; packets never leave the range of their network.

*/

use std::ops::Range;
use quantifiable_derive::Quantifiable;//the derive macro
use super::RouteAlgorithm;
use crate::error::Error;
use crate::error;

///A traffic class: a contiguous range of virtual channels routed with a given algorithm.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Quantifiable)]
pub struct VirtualNetwork
{
	pub start_vc: usize,
	pub num_vcs: usize,
	pub algorithm: RouteAlgorithm,
}

impl VirtualNetwork
{
	pub fn virtual_channels(&self) -> Range<usize>
	{
		self.start_vc..self.start_vc+self.num_vcs
	}
	pub fn contains(&self, virtual_channel:usize) -> bool
	{
		self.virtual_channels().contains(&virtual_channel)
	}
}

///The virtual networks of a router, laid out one after another from virtual channel 0.
#[derive(Clone,Debug,Quantifiable)]
pub struct VirtualNetworkRegistry
{
	networks: Vec<VirtualNetwork>,
}

impl VirtualNetworkRegistry
{
	///Build `num_vns` networks. A single algorithm is used for all of them; otherwise there must be one per network.
	pub fn new(num_vns:usize, algorithms:&[RouteAlgorithm]) -> Result<VirtualNetworkRegistry,Error>
	{
		if num_vns==0
		{
			return Err(error!(inconsistent_parameters).with_message("at least one virtual network is required".to_string()));
		}
		if algorithms.len()>num_vns
		{
			return Err(error!(inconsistent_parameters).with_message(format!("{} routing algorithms given for {} virtual networks",algorithms.len(),num_vns)));
		}
		let mut networks = Vec::with_capacity(num_vns);
		let mut start_vc = 0;
		for vn in 0..num_vns
		{
			let algorithm = match algorithms.len()
			{
				1 => algorithms[0],
				_ => *algorithms.get(vn).ok_or_else(||error!(missing_routing_algorithm,vn))?,
			};
			let num_vcs = algorithm.required_virtual_channels();
			networks.push(VirtualNetwork{start_vc,num_vcs,algorithm});
			start_vc += num_vcs;
		}
		Ok(VirtualNetworkRegistry{networks})
	}
	pub fn len(&self) -> usize
	{
		self.networks.len()
	}
	pub fn total_virtual_channels(&self) -> usize
	{
		self.networks.iter().map(|network|network.num_vcs).sum()
	}
	///Fails if the router has fewer virtual channels than the networks need.
	pub fn check_fits(&self, router_virtual_channels:usize) -> Result<(),Error>
	{
		let needed = self.total_virtual_channels();
		if needed > router_virtual_channels
		{
			return Err(error!(inconsistent_parameters).with_message(format!("the virtual networks need {} virtual channels but the router has {}",needed,router_virtual_channels)));
		}
		Ok(())
	}
	pub fn get(&self, vn:usize) -> Result<&VirtualNetwork,Error>
	{
		self.networks.get(vn).ok_or_else(||error!(missing_routing_algorithm,vn))
	}
	///The network owning a virtual channel, with its index.
	pub fn vn_of(&self, virtual_channel:usize) -> Result<(usize,&VirtualNetwork),Error>
	{
		self.networks.iter().enumerate().find(|(_,network)|network.contains(virtual_channel))
			.ok_or_else(||error!(virtual_channel_out_of_range,virtual_channel,self.total_virtual_channels()))
	}
	pub fn vcs_for(&self, vn:usize) -> Result<usize,Error>
	{
		Ok(self.get(vn)?.num_vcs)
	}
	///Write the number of virtual channels of each network. The buffer must have one entry per network.
	pub fn get_vcs_per_vn(&self, out:&mut [usize]) -> Result<(),Error>
	{
		if out.len()!=self.networks.len()
		{
			return Err(error!(inconsistent_parameters).with_message(format!("buffer of {} entries for {} virtual networks",out.len(),self.networks.len())));
		}
		for (slot,network) in out.iter_mut().zip(self.networks.iter())
		{
			*slot=network.num_vcs;
		}
		Ok(())
	}
}
