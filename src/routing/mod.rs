/*!

Routing of packets in a dragonfly. A [DragonflyRouting](dragonfly::DragonflyRouting) lives in each router and, for each packet, selects the output port and virtual channel.

Each virtual network selects one of the algorithms in [RouteAlgorithm]:

* `minimal`: exit the group through the router owning a global link to the destination group. At most local, global, local.
* `valiant`: go minimally to a random intermediate group and then minimally to the destination.
* `adaptive-local`: at the source group, compare the congestion of the minimal exit and of a Valiant exit and take the Valiant one when the minimal is much worse.

*/

pub mod table;
pub mod virtual_network;
pub mod dragonfly;

use std::fmt::{Display,Formatter};
use quantifiable_derive::Quantifiable;//the derive macro
use crate::config_parser::ConfigurationValue;
use crate::topology::dragonfly::DragonflyAddress;
use crate::error::Error;
use crate::error;
use crate::match_object;

///The routing algorithm of a virtual network.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Quantifiable)]
pub enum RouteAlgorithm
{
	Minimal,
	Valiant,
	AdaptiveLocal,
}

impl RouteAlgorithm
{
	pub fn from_name(name:&str) -> Result<RouteAlgorithm,Error>
	{
		match name
		{
			"minimal" => Ok(RouteAlgorithm::Minimal),
			"valiant" => Ok(RouteAlgorithm::Valiant),
			"adaptive-local" | "adaptive_local" => Ok(RouteAlgorithm::AdaptiveLocal),
			_ => Err(error!(unknown_routing_algorithm,name.to_string())),
		}
	}
	///Accepts either a literal with the name or an object `Minimal`, `Valiant` or `AdaptiveLocal`.
	pub fn from_configuration(cv:&ConfigurationValue) -> Result<RouteAlgorithm,Error>
	{
		match cv
		{
			&ConfigurationValue::Literal(ref name) => RouteAlgorithm::from_name(name),
			&ConfigurationValue::Object(ref name, ref pairs) if pairs.is_empty() => match name.as_ref()
			{
				"Minimal" => Ok(RouteAlgorithm::Minimal),
				"Valiant" => Ok(RouteAlgorithm::Valiant),
				"AdaptiveLocal" => Ok(RouteAlgorithm::AdaptiveLocal),
				_ => Err(error!(unknown_routing_algorithm,name.clone())),
			},
			_ => Err(error!(ill_formed_configuration,cv.clone()).with_message("bad value for algorithm".to_string())),
		}
	}
	///Each global hop moves the packet to the next virtual channel. Valiant paths may take two global hops.
	pub fn required_virtual_channels(&self) -> usize
	{
		match self
		{
			RouteAlgorithm::Minimal => 2,
			RouteAlgorithm::Valiant | RouteAlgorithm::AdaptiveLocal => 3,
		}
	}
}

impl Display for RouteAlgorithm
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		match self
		{
			RouteAlgorithm::Minimal => write!(formatter,"minimal"),
			RouteAlgorithm::Valiant => write!(formatter,"valiant"),
			RouteAlgorithm::AdaptiveLocal => write!(formatter,"adaptive-local"),
		}
	}
}

///How to select among the `N` parallel links joining two groups.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Quantifiable)]
pub enum LinkSlotPolicy
{
	///Always the same link.
	Fixed{slot:usize},
	///Rotate over the links with a counter kept by each router.
	RoundRobin,
	///A hash of the source endpoint and the target group. Packets of a same flow keep the same links.
	SourceHash,
	///Uniformly at random, with the random generator of the router.
	Random,
}

impl Default for LinkSlotPolicy
{
	fn default() -> LinkSlotPolicy
	{
		LinkSlotPolicy::SourceHash
	}
}

impl LinkSlotPolicy
{
	pub fn from_configuration(cv:&ConfigurationValue) -> Result<LinkSlotPolicy,Error>
	{
		let name = match cv
		{
			&ConfigurationValue::Object(ref name, _) => name.as_str(),
			_ => return Err(error!(ill_formed_configuration,cv.clone()).with_message("link_slot_policy must be an object".to_string())),
		};
		match name
		{
			"Fixed" =>
			{
				let mut slot=0;
				match_object!(cv,"Fixed",value,
					"slot" => slot=value.as_usize()?,
				);
				Ok(LinkSlotPolicy::Fixed{slot})
			},
			"RoundRobin" => Ok(LinkSlotPolicy::RoundRobin),
			"SourceHash" => Ok(LinkSlotPolicy::SourceHash),
			"Random" => Ok(LinkSlotPolicy::Random),
			_ => Err(error!(ill_formed_configuration,cv.clone()).with_message(format!("unknown link slot policy {}",name))),
		}
	}
}

///Mix a source endpoint with a target group into a well spread number.
pub fn source_hash(source:usize, target_group:usize) -> u64
{
	let mut x = (source as u64) ^ ((target_group as u64) << 32);
	x ^= x >> 33;
	x = x.wrapping_mul(0xff51afd7ed558ccd);
	x ^= x >> 33;
	x = x.wrapping_mul(0xc4ceb9fe1a85ec53);
	x ^ (x >> 33)
}

///Represent a port plus the virtual channel to use in it.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Default)]
pub struct CandidateEgress
{
	pub port: usize,
	pub virtual_channel: usize,
	///0 when following the minimal path, 1 when the packet has been diverted through an intermediate group.
	pub label: i32,
}

impl CandidateEgress
{
	pub fn new(port:usize, virtual_channel:usize)->CandidateEgress
	{
		CandidateEgress{
			port,
			virtual_channel,
			label: 0,
		}
	}
}

///The occupation of the output buffers in this cycle. Both arrays are indexed by `port*num_virtual_channels+virtual_channel`.
///Missing entries count as empty buffers.
#[derive(Clone,Copy,Debug)]
pub struct CongestionSnapshot<'a>
{
	pub credits: &'a [i32],
	pub queue_lengths: &'a [i32],
	pub num_virtual_channels: usize,
}

impl<'a> CongestionSnapshot<'a>
{
	///A snapshot where every buffer is empty.
	pub fn empty() -> CongestionSnapshot<'static>
	{
		CongestionSnapshot{
			credits: &[],
			queue_lengths: &[],
			num_virtual_channels: 0,
		}
	}
	///Queued packets relative to the space left downstream. Grows with the queue and decreases with the credits.
	pub fn cost(&self, port:usize, virtual_channel:usize) -> f64
	{
		let index = port*self.num_virtual_channels+virtual_channel;
		let queue = self.queue_lengths.get(index).cloned().unwrap_or(0).max(0);
		let credits = self.credits.get(index).cloned().unwrap_or(0).max(0);
		(queue as f64 + 1.0) / (credits as f64 + 1.0)
	}
}

///Where a packet is with respect to its path.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum PacketState
{
	///Still in the group it was injected in, which is not the destination group.
	AtSourceGroup,
	///In a group that is neither the source nor the destination. Only Valiant paths visit them.
	InIntermediateGroup,
	///In the destination group, but not yet at the router of the destination.
	InDestinationGroup,
	///At the router holding the destination host.
	AtDestinationRouter,
}

impl PacketState
{
	pub fn classify(current_group:usize, current_router:usize, src_group:usize, dest:&DragonflyAddress) -> PacketState
	{
		if current_group == dest.group as usize
		{
			if current_router == dest.router as usize
			{
				PacketState::AtDestinationRouter
			}
			else
			{
				PacketState::InDestinationGroup
			}
		}
		else if current_group == src_group
		{
			PacketState::AtSourceGroup
		}
		else
		{
			PacketState::InIntermediateGroup
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config_parser::{self,Token};

	fn parse(text:&str) -> ConfigurationValue
	{
		match config_parser::parse(text)
		{
			Ok(Token::Value(value)) => value,
			other => panic!("could not parse {}: {:?}",text,other),
		}
	}

	#[test]
	fn algorithm_names()
	{
		assert_eq!(RouteAlgorithm::from_name("adaptive-local").expect("known"),RouteAlgorithm::AdaptiveLocal);
		assert_eq!(RouteAlgorithm::from_configuration(&parse("\"valiant\"")).expect("known"),RouteAlgorithm::Valiant);
		assert_eq!(RouteAlgorithm::from_configuration(&parse("AdaptiveLocal")).expect("known"),RouteAlgorithm::AdaptiveLocal);
		assert!(matches!(RouteAlgorithm::from_name("ugal").unwrap_err().kind,crate::error::ErrorKind::UnknownRoutingAlgorithm{..}));
		assert_eq!(format!("{}",RouteAlgorithm::AdaptiveLocal),"adaptive-local");
	}

	#[test]
	fn slot_policies()
	{
		assert_eq!(LinkSlotPolicy::from_configuration(&parse("Fixed{slot:1}")).expect("known"),LinkSlotPolicy::Fixed{slot:1});
		assert_eq!(LinkSlotPolicy::from_configuration(&parse("RoundRobin")).expect("known"),LinkSlotPolicy::RoundRobin);
		assert!(LinkSlotPolicy::from_configuration(&parse("Fixed{lane:1}")).is_err());
		assert!(LinkSlotPolicy::from_configuration(&parse("\"Random\"")).is_err());
		assert_eq!(source_hash(17,3),source_hash(17,3));
		assert_ne!(source_hash(17,3),source_hash(17,4));
	}

	#[test]
	fn congestion_cost()
	{
		let credits = [4,0,-1,2];
		let queues = [0,3,1,0];
		let snapshot = CongestionSnapshot{credits:&credits,queue_lengths:&queues,num_virtual_channels:2};
		assert_eq!(snapshot.cost(0,0),0.2);
		assert_eq!(snapshot.cost(0,1),4.0);
		assert_eq!(snapshot.cost(1,0),2.0);
		assert_eq!(snapshot.cost(7,0),1.0);
		assert_eq!(CongestionSnapshot::empty().cost(3,1),1.0);
	}

	#[test]
	fn packet_states()
	{
		let dest = DragonflyAddress{group:6,mid_group:3,mid_group_shadow:3,router:1,host:0};
		assert_eq!(PacketState::classify(0,0,0,&dest),PacketState::AtSourceGroup);
		assert_eq!(PacketState::classify(3,2,0,&dest),PacketState::InIntermediateGroup);
		assert_eq!(PacketState::classify(6,2,0,&dest),PacketState::InDestinationGroup);
		assert_eq!(PacketState::classify(6,1,0,&dest),PacketState::AtDestinationRouter);
	}
}
