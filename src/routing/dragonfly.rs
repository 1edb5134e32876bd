/*!

The routing engine of a dragonfly router.

The enclosing router calls [DragonflyRouting::process_input] when a packet is injected by one of its hosts and [DragonflyRouting::route] for every packet at the head of an input buffer. Before the simulation starts it uses [DragonflyRouting::process_init_data_input] and [DragonflyRouting::route_init_data], which do not depend on the virtual networks nor on the congestion.

Each global hop moves the packet to the next virtual channel of its virtual network, which prevents cyclic dependencies between the global links.

*/

use std::cell::RefCell;
use std::fmt::{Display,Formatter};
use std::mem::size_of;
use std::rc::Rc;
use log::{debug,trace};
use rand::{Rng,SeedableRng};
use rand::rngs::StdRng;
use super::{CandidateEgress,CongestionSnapshot,LinkSlotPolicy,PacketState,RouteAlgorithm,source_hash};
use super::table::RouteToGroup;
use super::virtual_network::{VirtualNetwork,VirtualNetworkRegistry};
use crate::config::DragonflyConfiguration;
use crate::event::{DragonflyEvent,RouterEvent,INIT_BROADCAST_ADDRESS};
use crate::topology::dragonfly::{DragonflyAddress,DragonflyParameters,GlobalRouteMode,PortClass};
use crate::quantify::{Quantifiable,human_bytes};
use crate::error::Error;
use crate::error;

///What is at the other side of a port.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum PortState
{
	RouterToNode,
	RouterToRouter,
	Unconnected,
}

impl Display for PortState
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		match self
		{
			PortState::RouterToNode => write!(formatter,"R2N"),
			PortState::RouterToRouter => write!(formatter,"R2R"),
			PortState::Unconnected => write!(formatter,"UNCONNECTED"),
		}
	}
}

///The routing state of one router.
#[derive(Debug)]
pub struct DragonflyRouting
{
	parameters: DragonflyParameters,
	///Index of this router in the whole network.
	router_index: usize,
	group_id: usize,
	///Position of this router inside its group.
	router_id: usize,
	global_route_mode: GlobalRouteMode,
	table: RouteToGroup,
	virtual_networks: VirtualNetworkRegistry,
	adaptive_threshold: f64,
	link_slot_policy: LinkSlotPolicy,
	///Next slot for `LinkSlotPolicy::RoundRobin`, one counter per target group.
	round_robin: Vec<usize>,
	rng: StdRng,
	///Virtual channels per port of this router. Indexing stride of the congestion arrays.
	num_virtual_channels: usize,
	output_credits: Option<Rc<RefCell<Vec<i32>>>>,
	output_queue_lengths: Option<Rc<RefCell<Vec<i32>>>>,
}

impl DragonflyRouting
{
	///`table` must be bound to the shared table built from the same configuration.
	///`num_ports` and `num_virtual_channels` are those of the enclosing router.
	pub fn new(configuration:&DragonflyConfiguration, table:RouteToGroup, router_index:usize, num_ports:usize, num_virtual_channels:usize) -> Result<DragonflyRouting,Error>
	{
		let parameters = configuration.parameters;
		parameters.check_radix(num_ports)?;
		if router_index >= parameters.num_routers()
		{
			return Err(error!(inconsistent_parameters).with_message(format!("router {} in a network of {} routers",router_index,parameters.num_routers())));
		}
		if table.groups()!=parameters.table_rows() || table.routes()!=parameters.links_per_group_pair
		{
			return Err(error!(inconsistent_parameters).with_message(format!("a group table of {}x{} entries for {} groups with {} links per pair",table.groups(),table.routes(),parameters.num_groups,parameters.links_per_group_pair)));
		}
		let virtual_networks = configuration.virtual_networks()?;
		virtual_networks.check_fits(num_virtual_channels)?;
		let routing = DragonflyRouting{
			parameters,
			router_index,
			group_id: parameters.group_of(router_index),
			router_id: parameters.router_in_group(router_index),
			global_route_mode: configuration.global_route_mode,
			table,
			virtual_networks,
			adaptive_threshold: configuration.adaptive_threshold,
			link_slot_policy: configuration.link_slot_policy,
			round_robin: vec![0;parameters.num_groups],
			rng: StdRng::seed_from_u64(configuration.seed.wrapping_add(router_index as u64)),
			num_virtual_channels,
			output_credits: None,
			output_queue_lengths: None,
		};
		trace!("router {} is router {} of group {}",router_index,routing.router_id,routing.group_id);
		Ok(routing)
	}
	pub fn router_index(&self) -> usize
	{
		self.router_index
	}
	pub fn group_id(&self) -> usize
	{
		self.group_id
	}
	pub fn virtual_networks(&self) -> &VirtualNetworkRegistry
	{
		&self.virtual_networks
	}
	///The port that leads this router toward a remote group through the given parallel link.
	///With `from_router` the port is computed for that router of the group instead.
	pub fn port_for_group(&self, group:usize, slot:usize, from_router:Option<usize>) -> Result<usize,Error>
	{
		if group==self.group_id || group>=self.parameters.num_groups
		{
			return Err(error!(inconsistent_parameters).with_message(format!("group {} has no global link from group {}",group,self.group_id)));
		}
		let row = self.global_route_mode.row_of_group(self.group_id,group,self.parameters.num_groups);
		let pair = self.table.lookup(row,slot)?;
		let from_router = from_router.unwrap_or(self.router_id);
		if from_router >= self.parameters.routers_per_group
		{
			return Err(error!(inconsistent_parameters).with_message(format!("router {} in a group of {} routers",from_router,self.parameters.routers_per_group)));
		}
		if pair.router as usize == from_router
		{
			Ok(pair.port as usize)
		}
		else
		{
			Ok(self.parameters.port_for_router(from_router,pair.router as usize))
		}
	}
	fn choose_slot(&mut self, source:usize, target_group:usize) -> u16
	{
		let links = self.parameters.links_per_group_pair;
		let slot = match self.link_slot_policy
		{
			LinkSlotPolicy::Fixed{slot} => slot,
			LinkSlotPolicy::RoundRobin =>
			{
				match self.round_robin.get_mut(target_group)
				{
					Some(counter) =>
					{
						let slot = *counter;
						*counter = (slot+1) % links;
						slot
					},
					None => 0,
				}
			},
			LinkSlotPolicy::SourceHash => (source_hash(source,target_group) % links as u64) as usize,
			LinkSlotPolicy::Random => self.rng.gen_range(0..links),
		};
		slot as u16
	}
	///Uniformly among the groups that are neither this one nor `destination_group`. None when there are no such groups.
	fn random_intermediate_group(&mut self, destination_group:usize) -> Option<usize>
	{
		let g = self.parameters.num_groups;
		if g < 3
		{
			return None;
		}
		let (low,high) = if self.group_id < destination_group { (self.group_id,destination_group) } else { (destination_group,self.group_id) };
		let mut group = self.rng.gen_range(0..g-2);
		if group >= low { group+=1; }
		if group >= high { group+=1; }
		Some(group)
	}
	fn check_destination(&self, dest:&DragonflyAddress) -> Result<(),Error>
	{
		let p = &self.parameters;
		if dest.is_broadcast() || dest.group as usize >= p.num_groups || dest.router as usize >= p.routers_per_group || dest.host as usize >= p.hosts_per_router || dest.mid_group as usize >= p.num_groups
		{
			return Err(error!(endpoint_out_of_range,p.num_endpoints(),p.num_endpoints()).with_message(format!("cannot route toward {:?}",dest)));
		}
		Ok(())
	}
	///Send a packet at its source group through `intermediate` before its destination. Once done it is never changed.
	pub fn divert(&mut self, event:&mut DragonflyEvent, intermediate:usize) -> Result<(),Error>
	{
		if intermediate==event.src_group as usize || intermediate==event.dest.group as usize || intermediate>=self.parameters.num_groups
		{
			return Err(error!(inconsistent_parameters).with_message(format!("group {} cannot be intermediate from {} to {}",intermediate,event.src_group,event.dest.group)));
		}
		event.dest.mid_group = intermediate as u32;
		event.dest.mid_group_shadow = intermediate as u32;
		event.global_slice = self.choose_slot(event.request.source,intermediate);
		debug!("router {} sends the packet from {} to group {} through group {}",self.router_index,event.request.source,event.dest.group,intermediate);
		Ok(())
	}
	///Build the event for a packet injected by one of the hosts of this router.
	pub fn process_input(&mut self, raw:RouterEvent) -> Result<DragonflyEvent,Error>
	{
		let dest = self.parameters.locate(raw.destination)?;
		let vn:VirtualNetwork = *self.virtual_networks.get(raw.virtual_network)?;
		let source = raw.source;
		let mut event = DragonflyEvent{
			request: raw,
			virtual_channel: vn.start_vc,
			src_group: self.group_id as u32,
			dest,
			global_slice: 0,
			global_slice_shadow: 0,
		};
		let destination_group = dest.group as usize;
		if destination_group != self.group_id
		{
			let minimal_slot = self.choose_slot(source,destination_group);
			event.global_slice = minimal_slot;
			event.global_slice_shadow = minimal_slot;
			if vn.algorithm != RouteAlgorithm::Minimal
			{
				if let Some(intermediate) = self.random_intermediate_group(destination_group)
				{
					match vn.algorithm
					{
						RouteAlgorithm::Valiant => self.divert(&mut event,intermediate)?,
						_ =>
						{
							event.dest.mid_group_shadow = intermediate as u32;
							event.global_slice_shadow = self.choose_slot(source,intermediate);
						},
					}
				}
			}
		}
		trace!("router {} injects {:?}",self.router_index,event);
		Ok(event)
	}
	///Inject the congestion arrays of the enclosing router. They are read at each `route`.
	pub fn set_output_credit_array(&mut self, array:Rc<RefCell<Vec<i32>>>)
	{
		self.output_credits = Some(array);
	}
	pub fn set_output_queue_length_array(&mut self, array:Rc<RefCell<Vec<i32>>>)
	{
		self.output_queue_lengths = Some(array);
	}
	///Route with the congestion arrays injected by the enclosing router. Missing arrays count as empty buffers.
	///Fails if the router holds a mutable borrow of either array during the call.
	pub fn route(&mut self, port_in:usize, vc:usize, event:&mut DragonflyEvent) -> Result<CandidateEgress,Error>
	{
		let credits = self.output_credits.clone();
		let queue_lengths = self.output_queue_lengths.clone();
		let credits = credits.as_ref().map(|array|array.try_borrow().map_err(|_|error!(congestion_array_busy,"output credits".to_string()))).transpose()?;
		let queue_lengths = queue_lengths.as_ref().map(|array|array.try_borrow().map_err(|_|error!(congestion_array_busy,"output queue lengths".to_string()))).transpose()?;
		let snapshot = CongestionSnapshot{
			credits: credits.as_ref().map(|array|array.as_slice()).unwrap_or(&[]),
			queue_lengths: queue_lengths.as_ref().map(|array|array.as_slice()).unwrap_or(&[]),
			num_virtual_channels: self.num_virtual_channels,
		};
		self.route_with_snapshot(port_in, vc, event, &snapshot)
	}
	///Select the output port and virtual channel of a packet at this router, which currently is in `vc`.
	///The event is updated with the decisions taken and the new virtual channel.
	pub fn route_with_snapshot(&mut self, _port_in:usize, vc:usize, event:&mut DragonflyEvent, snapshot:&CongestionSnapshot) -> Result<CandidateEgress,Error>
	{
		let vn:VirtualNetwork = *self.virtual_networks.vn_of(vc)?.1;
		self.check_destination(&event.dest)?;
		let state = PacketState::classify(self.group_id,self.router_id,event.src_group as usize,&event.dest);
		let port = match state
		{
			PacketState::AtDestinationRouter => event.dest.host as usize,
			PacketState::InDestinationGroup => self.parameters.port_for_router(self.router_id,event.dest.router as usize),
			PacketState::AtSourceGroup | PacketState::InIntermediateGroup =>
			{
				if self.group_id == event.dest.mid_group as usize
				{
					//Second phase of a Valiant path.
					event.dest.mid_group = event.dest.group;
					event.global_slice = self.choose_slot(event.request.source,event.dest.group as usize);
					trace!("router {} starts the second phase of {:?}",self.router_index,event);
				}
				if vn.algorithm == RouteAlgorithm::AdaptiveLocal && state == PacketState::AtSourceGroup
					&& event.dest.mid_group == event.dest.group && event.dest.mid_group_shadow != event.dest.group
					&& event.dest.mid_group_shadow as usize != self.group_id
				{
					self.adaptive_decision(vc,event,snapshot)?;
				}
				self.port_for_group(event.dest.mid_group as usize,event.global_slice as usize,None)?
			},
		};
		let virtual_channel = if self.parameters.port_class(port)? == PortClass::Global { vc+1 } else { vc };
		if !vn.contains(virtual_channel)
		{
			return Err(error!(virtual_channel_out_of_range,virtual_channel,vn.start_vc+vn.num_vcs)
				.with_message(format!("the {} virtual network has no virtual channel for another global hop",vn.algorithm)));
		}
		event.virtual_channel = virtual_channel;
		let mut egress = CandidateEgress::new(port,virtual_channel);
		if event.dest.mid_group != event.dest.group || state == PacketState::InIntermediateGroup
		{
			egress.label = 1;
		}
		trace!("router {} sends {:?} through port {} vc {}",self.router_index,event.dest,port,virtual_channel);
		Ok(egress)
	}
	///Compare the minimal exit with the exit toward the shadow intermediate group and commit to the latter if the minimal one is much more congested.
	fn adaptive_decision(&mut self, vc:usize, event:&mut DragonflyEvent, snapshot:&CongestionSnapshot) -> Result<(),Error>
	{
		let minimal_port = self.port_for_group(event.dest.group as usize,event.global_slice as usize,None)?;
		let valiant_port = self.port_for_group(event.dest.mid_group_shadow as usize,event.global_slice_shadow as usize,None)?;
		let next_vc = |port:usize| if self.parameters.global_ports().contains(&port) { vc+1 } else { vc };
		let minimal_cost = snapshot.cost(minimal_port,next_vc(minimal_port));
		let valiant_cost = snapshot.cost(valiant_port,next_vc(valiant_port));
		if minimal_cost > self.adaptive_threshold*valiant_cost
		{
			debug!("router {} diverts through group {}, cost {} against {}",self.router_index,event.dest.mid_group_shadow,minimal_cost,valiant_cost);
			event.dest.mid_group = event.dest.mid_group_shadow;
			std::mem::swap(&mut event.global_slice,&mut event.global_slice_shadow);
		}
		Ok(())
	}
	///Minimal port toward an address, with the slot given by the source hash. Used where no state may be touched.
	fn deterministic_port(&self, source:usize, dest:&DragonflyAddress) -> Result<usize,Error>
	{
		let group = dest.group as usize;
		if group == self.group_id
		{
			if dest.router as usize == self.router_id
			{
				Ok(dest.host as usize)
			}
			else
			{
				Ok(self.parameters.port_for_router(self.router_id,dest.router as usize))
			}
		}
		else
		{
			let slot = (source_hash(source,group) % self.parameters.links_per_group_pair as u64) as usize;
			self.port_for_group(group,slot,None)
		}
	}
	///Control packets always take a minimal path, whatever their virtual network.
	pub fn route_control_packet(&self, raw:&RouterEvent) -> Result<usize,Error>
	{
		let dest = self.parameters.locate(raw.destination)?;
		self.deterministic_port(raw.source,&dest)
	}
	///Build the event of initialization data. It can be addressed to `INIT_BROADCAST_ADDRESS`.
	pub fn process_init_data_input(&self, raw:RouterEvent) -> Result<DragonflyEvent,Error>
	{
		let dest = if raw.destination == INIT_BROADCAST_ADDRESS
		{
			DragonflyAddress::broadcast()
		}
		else
		{
			self.parameters.locate(raw.destination)?
		};
		Ok(DragonflyEvent{
			request: raw,
			virtual_channel: 0,
			src_group: self.group_id as u32,
			dest,
			global_slice: 0,
			global_slice_shadow: 0,
		})
	}
	///Output ports for initialization data arriving by `port_in`. Broadcasts are spread so every host gets a single copy:
	///the source router sends to its group and to the groups it has links to, every other router of the source group to the groups it has links to,
	///and the routers of other groups inside their own group.
	pub fn route_init_data(&self, port_in:usize, event:&DragonflyEvent) -> Result<Vec<usize>,Error>
	{
		if !event.dest.is_broadcast()
		{
			return Ok(vec![self.deterministic_port(event.request.source,&event.dest)?]);
		}
		let p = &self.parameters;
		let mut ports = vec![];
		let class = p.port_class(port_in)?;
		ports.extend(p.host_ports().filter(|&port| class!=PortClass::Host || port!=port_in));
		if class != PortClass::Group
		{
			ports.extend(p.intra_group_ports());
		}
		if class != PortClass::Global && event.src_group as usize == self.group_id
		{
			for row in 0..p.table_rows()
			{
				let pair = self.table.lookup(row,0)?;
				if pair.router as usize == self.router_id
				{
					ports.push(pair.port as usize);
				}
			}
		}
		Ok(ports)
	}
	///The router and host port where an endpoint is attached.
	pub fn get_delivery_port_for_endpoint(&self, endpoint:usize) -> Result<(usize,usize),Error>
	{
		let limit = self.parameters.num_endpoints();
		if endpoint >= limit
		{
			return Err(error!(endpoint_out_of_range,endpoint,limit));
		}
		Ok((endpoint/self.parameters.hosts_per_router,endpoint%self.parameters.hosts_per_router))
	}
	///The endpoint attached to a host port of this router.
	pub fn get_endpoint_id(&self, port:usize) -> Result<usize,Error>
	{
		if self.parameters.port_class(port)? != PortClass::Host
		{
			return Err(error!(port_out_of_range,port,self.parameters.hosts_per_router).with_message("only host ports have endpoints".to_string()));
		}
		Ok(self.router_index*self.parameters.hosts_per_router+port)
	}
	pub fn get_port_state(&self, port:usize) -> Result<PortState,Error>
	{
		Ok(match self.parameters.port_class(port)?
		{
			PortClass::Host => PortState::RouterToNode,
			PortClass::Group => PortState::RouterToRouter,
			PortClass::Global => if self.table.is_used(self.router_id,port) { PortState::RouterToRouter } else { PortState::Unconnected },
		})
	}
	///One of `host`, `group` or `global`.
	pub fn get_port_logical_group(&self, port:usize) -> Result<String,Error>
	{
		Ok(self.parameters.port_class(port)?.to_string())
	}
	pub fn get_vcs_per_vn(&self, out:&mut [usize]) -> Result<(),Error>
	{
		self.virtual_networks.get_vcs_per_vn(out)
	}
}

impl Quantifiable for DragonflyRouting
{
	fn total_memory(&self) -> usize
	{
		size_of::<DragonflyRouting>() - size_of::<RouteToGroup>() - size_of::<VirtualNetworkRegistry>() - size_of::<Vec<usize>>()
			+ self.table.total_memory() + self.virtual_networks.total_memory() + self.round_robin.total_memory()
	}
	fn print_memory_breakdown(&self)
	{
		println!("DragonflyRouting of router {}: {}",self.router_index,human_bytes(self.total_memory()));
		println!("\ttable view: {}",human_bytes(self.table.total_memory()));
		println!("\tvirtual networks: {}",human_bytes(self.virtual_networks.total_memory()));
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config_parser::{self,ConfigurationValue,Token};
	use crate::error::ErrorKind;
	use crate::topology::{Topology,Location};
	use crate::topology::dragonfly::Dragonfly;

	fn parse(text:&str) -> ConfigurationValue
	{
		match config_parser::parse(text)
		{
			Ok(Token::Value(value)) => value,
			other => panic!("could not parse {}: {:?}",text,other),
		}
	}

	///Every router of a network, to follow packets.
	struct Network
	{
		configuration: DragonflyConfiguration,
		topology: Dragonfly,
		routers: Vec<DragonflyRouting>,
	}

	///A visited router: its index, the group targeted when it received the packet, and the egress taken.
	#[derive(Debug)]
	struct Hop
	{
		router: usize,
		mid_group: u32,
		egress: CandidateEgress,
	}

	impl Network
	{
		fn new(configuration:DragonflyConfiguration) -> Network
		{
			let _ = env_logger::builder().is_test(true).try_init();
			let table = configuration.route_table().expect("complete table");
			let topology = configuration.topology(table.clone()).expect("consistent wiring");
			let parameters = configuration.parameters;
			let vcs = configuration.virtual_networks().expect("valid").total_virtual_channels();
			let routers = (0..parameters.num_routers()).map(|index|
				DragonflyRouting::new(&configuration,table.clone(),index,parameters.radix(),vcs).expect("valid router")
			).collect();
			Network{configuration,topology,routers}
		}
		fn from_text(text:&str) -> Network
		{
			Network::new(DragonflyConfiguration::new(&parse(text)).expect("valid configuration"))
		}
		fn request(source:usize, destination:usize, virtual_network:usize) -> RouterEvent
		{
			RouterEvent{source,destination,virtual_network,size_in_bits:64}
		}
		fn inject(&mut self, source:usize, destination:usize, virtual_network:usize) -> DragonflyEvent
		{
			let router = source/self.configuration.parameters.hosts_per_router;
			self.routers[router].process_input(Network::request(source,destination,virtual_network)).expect("valid request")
		}
		///Follow the packet from its source until it is delivered to its destination.
		fn walk(&mut self, mut event:DragonflyEvent) -> Vec<Hop>
		{
			let p = self.configuration.parameters;
			let mut router = event.request.source/p.hosts_per_router;
			let mut port_in = event.request.source%p.hosts_per_router;
			let mut hops = vec![];
			loop
			{
				assert!(hops.len()<10,"routing loop {:?}",hops);
				let mid_group = event.dest.mid_group;
				let vc = event.virtual_channel;
				let egress = self.routers[router].route(port_in,vc,&mut event).expect("routable");
				hops.push(Hop{router,mid_group,egress});
				match self.topology.neighbour(router,egress.port)
				{
					(Location::ServerPort(server),_) =>
					{
						assert_eq!(server,event.request.destination,"delivered to the wrong host");
						return hops;
					},
					(Location::RouterPort{router_index,router_port},_) =>
					{
						router=router_index;
						port_in=router_port;
					},
					(Location::None,_) => panic!("sent through the unconnected port {} of router {}",egress.port,router),
				}
			}
		}
	}

	const EXAMPLE: &str = "hosts_per_router:4, routers_per_group:4, intergroup_per_router:4, num_groups:9";

	#[test]
	fn minimal_example_path()
	{
		let mut network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"minimal\"}}",EXAMPLE));
		let event = network.inject(0,100,0);
		assert_eq!(event.dest,DragonflyAddress{group:6,mid_group:6,mid_group_shadow:6,router:1,host:0});
		let hops = network.walk(event);
		let routers:Vec<usize> = hops.iter().map(|hop|hop.router).collect();
		let ports:Vec<usize> = hops.iter().map(|hop|hop.egress.port).collect();
		let vcs:Vec<usize> = hops.iter().map(|hop|hop.egress.virtual_channel).collect();
		//Local hop to the router owning the link to group 6, global hop, delivery.
		assert_eq!(routers,vec![0,2,25]);
		assert_eq!(ports,vec![5,8,0]);
		assert_eq!(vcs,vec![0,1,1]);
		assert!(hops.iter().all(|hop|hop.egress.label==0));
	}

	#[test]
	fn minimal_paths_are_short()
	{
		let configurations = [
			format!("Dragonfly{{{}, algorithm:\"minimal\"}}",EXAMPLE),
			format!("Dragonfly{{{}, algorithm:\"minimal\", global_route_mode:\"absolute\"}}",EXAMPLE),
			"Dragonfly{hosts_per_router:2, routers_per_group:4, intergroup_per_router:4, num_groups:9, intergroup_links:2, algorithm:\"minimal\", link_slot_policy:RoundRobin}".to_string(),
		];
		for text in configurations.iter()
		{
			let mut network = Network::from_text(text);
			let p = network.configuration.parameters;
			for source in 0..p.num_endpoints()
			{
				for destination in (0..p.num_endpoints()).step_by(3)
				{
					let event = network.inject(source,destination,0);
					let hops = network.walk(event);
					let router_hops = hops.len()-1;
					let source_router = source/p.hosts_per_router;
					let destination_router = destination/p.hosts_per_router;
					let limit = if source_router==destination_router { 0 }
						else if p.group_of(source_router)==p.group_of(destination_router) { 1 }
						else { 3 };
					assert!(router_hops<=limit,"{} hops from {} to {} in {}",router_hops,source,destination,text);
				}
			}
		}
	}

	#[test]
	fn valiant_forced_intermediate()
	{
		let mut network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"valiant\"}}",EXAMPLE));
		let mut event = network.inject(0,100,0);
		network.routers[0].divert(&mut event,3).expect("valid intermediate");
		let hops = network.walk(event);
		let routers:Vec<usize> = hops.iter().map(|hop|hop.router).collect();
		assert_eq!(routers,vec![0,1,14,13,26,25]);
		let groups:Vec<usize> = routers.iter().map(|&router|router/4).collect();
		assert_eq!(groups,vec![0,0,3,3,6,6]);
		//The intermediate group is kept until the packet is inside it.
		let mids:Vec<u32> = hops.iter().map(|hop|hop.mid_group).collect();
		assert_eq!(mids,vec![3,3,3,6,6,6]);
		let vcs:Vec<usize> = hops.iter().map(|hop|hop.egress.virtual_channel).collect();
		assert_eq!(vcs,vec![0,1,1,2,2,2]);
		assert_eq!(hops[0].egress.label,1);
		let mut other = network.inject(0,100,0);
		assert!(network.routers[0].divert(&mut other,6).is_err());
		assert!(network.routers[0].divert(&mut other,0).is_err());
	}

	#[test]
	fn valiant_intermediate_differs_from_endpoints()
	{
		for seed in 0..20
		{
			let mut network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"valiant\", link_slot_policy:Random, seed:{}}}",EXAMPLE,seed));
			let mut seen = vec![false;9];
			for destination in 16..144
			{
				let event = network.inject(1,destination,0);
				let mid = event.dest.mid_group;
				assert!(mid!=0 && mid!=event.dest.group,"intermediate {} for a packet from group 0 to {}",mid,event.dest.group);
				assert_eq!(event.dest.mid_group_shadow,mid);
				seen[mid as usize]=true;
				let hops = network.walk(event);
				assert!(hops.len()<=6);
			}
			assert!(seen[1..].iter().all(|&s|s),"some group never chosen with seed {}",seed);
		}
		//With three groups there is a single choice, with two there is none.
		let mut network = Network::from_text("Dragonfly{hosts_per_router:1, routers_per_group:2, intergroup_per_router:1, num_groups:3, algorithm:\"valiant\"}");
		assert_eq!(network.inject(0,2,0).dest.mid_group,2);
		let mut network = Network::from_text("Dragonfly{hosts_per_router:1, routers_per_group:2, intergroup_per_router:1, num_groups:2, algorithm:\"valiant\"}");
		let event = network.inject(0,2,0);
		assert_eq!(event.dest.mid_group,1);
		assert_eq!(network.walk(event).len(),2);
	}

	///An adaptive packet from host 0 to host 100 with group 3 as alternative.
	fn adaptive_setup(threshold:f64) -> (Network,DragonflyEvent)
	{
		let mut configuration = DragonflyConfiguration::new(&parse(&format!("Dragonfly{{{}, algorithm:\"adaptive-local\"}}",EXAMPLE))).expect("valid configuration");
		configuration.adaptive_threshold = threshold;
		let mut network = Network::new(configuration);
		let mut event = network.inject(0,100,0);
		event.dest.mid_group_shadow = 3;
		event.global_slice_shadow = 0;
		(network,event)
	}

	///Router 0 reaches group 6 by port 5 and group 3 by port 4, both local. Three virtual channels per port.
	fn congestion(minimal_queue:i32) -> (Vec<i32>,Vec<i32>)
	{
		let credits = vec![0;11*3];
		let mut queues = vec![0;11*3];
		queues[5*3] = minimal_queue;
		(credits,queues)
	}

	#[test]
	fn adaptive_threshold_decides()
	{
		let (mut network,event) = adaptive_setup(2.0);
		assert_eq!(event.dest.mid_group,6);
		assert_eq!(network.routers[0].port_for_group(6,0,None).expect("linked"),5);
		assert_eq!(network.routers[0].port_for_group(3,0,None).expect("linked"),4);
		//Minimal cost 4 against 1.
		let (credits,queues) = congestion(3);
		let snapshot = CongestionSnapshot{credits:&credits,queue_lengths:&queues,num_virtual_channels:3};
		let mut diverted = event.clone();
		let egress = network.routers[0].route_with_snapshot(0,0,&mut diverted,&snapshot).expect("routable");
		assert_eq!((egress.port,egress.virtual_channel,egress.label),(4,0,1));
		assert_eq!(diverted.dest.mid_group,3);
		//Same inputs, same answer.
		let mut again = event.clone();
		assert_eq!(network.routers[0].route_with_snapshot(0,0,&mut again,&snapshot).expect("routable"),egress);
		assert_eq!(again,diverted);
		//Minimal cost 2 is not more than twice 1.
		let (credits,queues) = congestion(1);
		let snapshot = CongestionSnapshot{credits:&credits,queue_lengths:&queues,num_virtual_channels:3};
		let mut kept = event.clone();
		let egress = network.routers[0].route_with_snapshot(0,0,&mut kept,&snapshot).expect("routable");
		assert_eq!((egress.port,egress.label),(5,0));
		assert_eq!(kept.dest.mid_group,6);
		//The diverted packet completes its path through group 3.
		let hops = network.walk(diverted);
		assert!(hops.iter().any(|hop|hop.router/4==3));
	}

	#[test]
	fn adaptive_with_infinite_threshold_is_minimal()
	{
		let (mut network,event) = adaptive_setup(f64::INFINITY);
		let (credits,queues) = congestion(1000);
		let snapshot = CongestionSnapshot{credits:&credits,queue_lengths:&queues,num_virtual_channels:3};
		let mut adaptive = event.clone();
		let egress = network.routers[0].route_with_snapshot(0,0,&mut adaptive,&snapshot).expect("routable");
		assert_eq!((egress.port,egress.label),(5,0));
		let mut minimal = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"minimal\"}}",EXAMPLE));
		let reference = minimal.inject(0,100,0);
		let reference = minimal.walk(reference);
		//Inject the same congestion through the shared arrays for the whole walk.
		network.routers[0].set_output_credit_array(Rc::new(RefCell::new(credits)));
		network.routers[0].set_output_queue_length_array(Rc::new(RefCell::new(queues)));
		let hops = network.walk(event);
		let ports = |hops:&[Hop]| hops.iter().map(|hop|(hop.router,hop.egress.port)).collect::<Vec<_>>();
		assert_eq!(ports(&hops[..]),ports(&reference[..]));
	}

	#[test]
	fn injected_arrays_are_read_live()
	{
		let (mut network,event) = adaptive_setup(2.0);
		let (credits,queues) = congestion(0);
		let queues = Rc::new(RefCell::new(queues));
		network.routers[0].set_output_credit_array(Rc::new(RefCell::new(credits)));
		network.routers[0].set_output_queue_length_array(queues.clone());
		let mut calm = event.clone();
		assert_eq!(network.routers[0].route(0,0,&mut calm).expect("routable").port,5);
		queues.borrow_mut()[5*3] = 10;
		let mut busy = event.clone();
		assert_eq!(network.routers[0].route(0,0,&mut busy).expect("routable").port,4);
		//The router is still writing the queue lengths.
		let writing = queues.borrow_mut();
		let mut blocked = event.clone();
		assert!(matches!(network.routers[0].route(0,0,&mut blocked).unwrap_err().kind,ErrorKind::CongestionArrayBusy{..}));
		drop(writing);
		assert!(network.routers[0].route(0,0,&mut blocked).is_ok());
	}

	#[test]
	fn adaptive_random_traffic_is_delivered()
	{
		let mut network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"adaptive-local\", seed:3}}",EXAMPLE));
		for router in network.routers.iter_mut()
		{
			//Local ports busy so that some packets divert.
			let mut queues = vec![0;11*3];
			for port in 4..7 { queues[port*3] = (port as i32)*2; }
			router.set_output_credit_array(Rc::new(RefCell::new(vec![0;11*3])));
			router.set_output_queue_length_array(Rc::new(RefCell::new(queues)));
		}
		for source in (0..144).step_by(7)
		{
			for destination in (0..144).step_by(5)
			{
				let event = network.inject(source,destination,0);
				let hops = network.walk(event);
				assert!(hops.len()<=7);
			}
		}
	}

	#[test]
	fn control_packets_are_minimal()
	{
		let network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"valiant\"}}",EXAMPLE));
		let request = Network::request(0,100,0);
		assert_eq!(network.routers[0].route_control_packet(&request).expect("routable"),5);
		assert_eq!(network.routers[2].route_control_packet(&request).expect("routable"),8);
		assert_eq!(network.routers[26].route_control_packet(&request).expect("routable"),5);
		assert_eq!(network.routers[25].route_control_packet(&request).expect("routable"),0);
		assert!(network.routers[0].route_control_packet(&Network::request(0,144,0)).is_err());
	}

	#[test]
	fn init_broadcast_reaches_every_host_once()
	{
		for text in &[format!("Dragonfly{{{}, algorithm:\"minimal\"}}",EXAMPLE),format!("Dragonfly{{{}, algorithm:\"minimal\", global_route_mode:\"absolute\"}}",EXAMPLE)]
		{
			let network = Network::from_text(text);
			let source = 37;
			let first = source/4;
			let event = network.routers[first].process_init_data_input(Network::request(source,INIT_BROADCAST_ADDRESS,0)).expect("broadcast");
			assert!(event.dest.is_broadcast());
			let mut received = vec![0;144];
			let mut pending = vec![(first,source%4)];
			while let Some((router,port_in)) = pending.pop()
			{
				for port in network.routers[router].route_init_data(port_in,&event).expect("routable")
				{
					match network.topology.neighbour(router,port).0
					{
						Location::ServerPort(server) => received[server]+=1,
						Location::RouterPort{router_index,router_port} => pending.push((router_index,router_port)),
						Location::None => panic!("broadcast through an unconnected port"),
					}
				}
			}
			for (host,&count) in received.iter().enumerate()
			{
				assert_eq!(count,if host==source {0} else {1},"host {} got {} copies",host,count);
			}
		}
		let network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"valiant\"}}",EXAMPLE));
		let event = network.routers[0].process_init_data_input(Network::request(0,100,0)).expect("unicast");
		assert_eq!(network.routers[0].route_init_data(0,&event).expect("routable"),vec![5]);
	}

	#[test]
	fn port_queries()
	{
		let network = Network::from_text(&format!("Dragonfly{{{}, algorithm:[\"minimal\",\"adaptive-local\"]}}",EXAMPLE));
		let router = &network.routers[0];
		assert_eq!(router.get_port_state(0).expect("in range"),PortState::RouterToNode);
		assert_eq!(router.get_port_state(4).expect("in range"),PortState::RouterToRouter);
		assert_eq!(router.get_port_state(7).expect("in range"),PortState::RouterToRouter);
		assert_eq!(router.get_port_state(9).expect("in range"),PortState::Unconnected);
		assert_eq!(router.get_port_state(9).expect("in range").to_string(),"UNCONNECTED");
		assert!(matches!(router.get_port_state(11).unwrap_err().kind,ErrorKind::PortOutOfRange{port:11,radix:11}));
		let names:Vec<String> = [3,6,10].iter().map(|&port|router.get_port_logical_group(port).expect("in range")).collect();
		assert_eq!(names,vec!["host","group","global"]);
		assert_eq!(network.routers[25].get_endpoint_id(2).expect("host port"),102);
		assert!(network.routers[25].get_endpoint_id(4).is_err());
		assert_eq!(router.get_delivery_port_for_endpoint(100).expect("in range"),(25,0));
		assert!(router.get_delivery_port_for_endpoint(144).is_err());
		let mut buffer = [0;2];
		router.get_vcs_per_vn(&mut buffer).expect("one entry per network");
		assert_eq!(buffer,[2,3]);
		assert_eq!(router.port_for_group(6,0,Some(2)).expect("linked"),8);
		assert_eq!(router.port_for_group(6,0,Some(1)).expect("linked"),5);
		assert!(router.port_for_group(0,0,None).is_err());
		assert!(matches!(router.port_for_group(6,0,Some(4)).unwrap_err().kind,ErrorKind::InconsistentParameters));
		assert!(matches!(router.port_for_group(6,0,Some(99)).unwrap_err().kind,ErrorKind::InconsistentParameters));
		assert!(router.total_memory() >= size_of::<DragonflyRouting>()/2);
	}

	#[test]
	fn round_robin_alternates_parallel_links()
	{
		let mut network = Network::from_text("Dragonfly{hosts_per_router:2, routers_per_group:4, intergroup_per_router:4, num_groups:9, intergroup_links:2, algorithm:\"minimal\", link_slot_policy:RoundRobin}");
		let slots:Vec<u16> = (0..4).map(|_|network.inject(0,70,0).global_slice).collect();
		assert_eq!(slots,vec![0,1,0,1]);
		let first = network.inject(0,70,0);
		let second = network.inject(0,70,0);
		let first_hops = network.walk(first);
		let second_hops = network.walk(second);
		assert_ne!(first_hops[1].router,second_hops[1].router,"both packets left by the same link");
	}

	#[test]
	fn round_robin_rotates_for_every_algorithm()
	{
		let base = "hosts_per_router:2, routers_per_group:4, intergroup_per_router:4, num_groups:9, intergroup_links:2, link_slot_policy:RoundRobin";
		//Each target group keeps its own rotation, so the draw toward the intermediate group does not disturb the one toward the destination.
		let mut network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"valiant\"}}",base));
		let mut uses = vec![0u16;9];
		let mut first_phase = vec![];
		for index in 0..14
		{
			let event = network.inject(0,70,0);
			let mid = event.dest.mid_group as usize;
			assert_eq!(event.global_slice,uses[mid]%2);
			assert_eq!(event.global_slice_shadow,(index%2) as u16);
			uses[mid]+=1;
			first_phase.push(event.global_slice);
			network.walk(event);
		}
		//Seven candidate groups for fourteen packets.
		assert!(first_phase.contains(&0) && first_phase.contains(&1));
		let mut network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"adaptive-local\"}}",base));
		let mut uses = vec![0u16;9];
		let mut minimal = vec![];
		let mut detour = vec![];
		for _ in 0..14
		{
			let event = network.inject(0,70,0);
			let mid = event.dest.mid_group_shadow as usize;
			assert_eq!(event.global_slice_shadow,uses[mid]%2);
			uses[mid]+=1;
			minimal.push(event.global_slice);
			detour.push(event.global_slice_shadow);
		}
		assert_eq!(minimal,(0..14).map(|index|(index%2) as u16).collect::<Vec<u16>>());
		assert!(detour.contains(&0) && detour.contains(&1));
	}

	#[test]
	fn bad_requests_and_constructions()
	{
		let mut network = Network::from_text(&format!("Dragonfly{{{}, algorithm:\"minimal\"}}",EXAMPLE));
		let router = &mut network.routers[0];
		assert!(matches!(router.process_input(Network::request(0,144,0)).unwrap_err().kind,ErrorKind::EndpointOutOfRange{endpoint:144,limit:144}));
		assert!(matches!(router.process_input(Network::request(0,100,1)).unwrap_err().kind,ErrorKind::MissingRoutingAlgorithm{virtual_network:1}));
		let mut event = router.process_input(Network::request(0,100,0)).expect("valid request");
		assert!(matches!(router.route(0,2,&mut event).unwrap_err().kind,ErrorKind::VirtualChannelOutOfRange{..}));
		//A packet already in its last virtual channel cannot take another global link.
		let mut event = network.routers[2].process_input(Network::request(8,100,0)).expect("valid request");
		assert!(matches!(network.routers[2].route(0,1,&mut event).unwrap_err().kind,ErrorKind::VirtualChannelOutOfRange{virtual_channel:2,limit:2}));
		let configuration = &network.configuration;
		let table = configuration.route_table().expect("complete table");
		assert!(DragonflyRouting::new(configuration,table.clone(),0,12,2).is_err());
		assert!(DragonflyRouting::new(configuration,table.clone(),0,11,1).is_err());
		assert!(DragonflyRouting::new(configuration,table.clone(),36,11,2).is_err());
		assert!(DragonflyRouting::new(configuration,RouteToGroup::new(),0,11,2).is_err());
		assert!(DragonflyRouting::new(configuration,table,35,11,4).is_ok());
	}
}
