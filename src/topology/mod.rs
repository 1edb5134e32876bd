
pub mod dragonfly;

use log::warn;
use quantifiable_derive::Quantifiable;//the derive macro
use crate::matrix::Matrix;
use crate::quantify::Quantifiable;
use crate::error::Error;
use crate::error;

///A location where a packet can be inserted.
///None is used for disconnected ports, for example global ports left out of the link map.
#[derive(Clone,Debug,PartialEq,Quantifiable)]
pub enum Location
{
	RouterPort{
		router_index: usize,
		router_port: usize,
	},
	ServerPort(usize),
	None,
}

///A topology describes how routers and servers are connected.
///The router `index` has `ports(index)` ports, of which `degree(index)` lead to other routers.
///Unlike other networks the ports of servers are not required to be the last ones.
pub trait Topology : Quantifiable + std::fmt::Debug
{
	fn num_routers(&self) -> usize;
	fn num_servers(&self) -> usize;
	///Neighbours of a router: Location+link class index
	fn neighbour(&self, router_index:usize, port:usize) -> (Location,usize);
	///The neighbour of a server: Location+link class index
	fn server_neighbour(&self, server_index:usize) -> (Location,usize);
	/// Number of ports used to other routers, connected or not.
	fn degree(&self, router_index: usize) -> usize;
	fn ports(&self, router_index: usize) -> usize;

	///Breadth First Search to compute distances from a router to all others.
	///It may use weights, but it there are multiple paths with different distances it may give a non-minimal distance, since it is not Dijkstra.
	fn bfs(&self, origin:usize, class_weight:Option<&[usize]>) -> Vec<usize>
	{
		let n=self.num_routers();
		#[allow(non_snake_case)]
		let mut R=vec![<usize>::max_value();n];
		R[origin]=0;
		let queue_len=match class_weight
		{
			Some(ref v)=> n*v.len(),
			None => n,
		};
		let mut queue=vec![0;queue_len];
		let mut queue_read_index=0;//Next to read
		let mut queue_write_index=1;//Next to write
		queue[0]=origin;
		while queue_read_index<queue_write_index
		{
			let best=queue[queue_read_index];
			queue_read_index+=1;
			for i in 0..self.ports(best)
			{
				if let (Location::RouterPort{router_index,router_port:_},link_class) = self.neighbour(best,i)
				{
					let weight= if let Some(ref v)=class_weight
					{
						if link_class>=v.len()
						{
							continue//next neighbour
						}
						let x=v[link_class];
						if x==<usize>::max_value()
						{
							continue//next neighbour
						}
						x
					}
					else
					{
						1
					};
					let alt=R[best].saturating_add(weight);
					if alt<R[router_index] && queue_write_index<queue.len()
					{
						R[router_index]=alt;
						queue[queue_write_index]=router_index;
						queue_write_index+=1;
					}
				}
			}
		}
		return R;
	}

	fn compute_distance_matrix(&self, class_weight:Option<&[usize]>) -> Matrix<usize>
	{
		let n=self.num_routers();
		let mut matrix=Matrix::constant(0,n,n);
		for i in 0..n
		{
			let d=self.bfs(i,class_weight);
			for j in 0..n
			{
				*matrix.get_mut(i,j)=d[j];
			}
		}
		return matrix;
	}

	///The greatest distance between two routers. `usize::max_value()` if the network is disconnected.
	fn diameter(&self) -> usize
	{
		let distances = self.compute_distance_matrix(None);
		distances.outside_diagonal().cloned().max().unwrap_or(0)
	}

	///Check pairs (router,port) with
	/// * non-matching endpoint (this is, going backwards a wire you should return to the same router/server)
	/// * non-matching link classes at both sides of a wire
	/// * optionally check that the link class is within bounds.
	///Disconnected ports are only reported in the log.
	fn check_adjacency_consistency(&self,amount_link_classes: Option<usize>) -> Result<(),Error>
	{
		let n=self.num_routers();
		for router_index in 0..n
		{
			for port_index in 0..self.ports(router_index)
			{
				let (neighbour_location, link_class) = self.neighbour(router_index, port_index);
				if let Some(bound) = amount_link_classes
				{
					if link_class>=bound
					{
						return Err(error!(inconsistent_wiring).with_message(format!("link class {} out of bound {} for port {} of router {}",link_class,bound,port_index,router_index)));
					}
				}
				let (rev_location, rev_link_class) = match neighbour_location
				{
					Location::RouterPort{
						router_index: neighbour_router,
						router_port: neighbour_port,
					} => self.neighbour(neighbour_router, neighbour_port),
					Location::ServerPort(server_index) => self.server_neighbour(server_index),
					Location::None =>
					{
						warn!("disconnected port {} at router {}",port_index,router_index);
						continue;
					}
				};
				let back = Location::RouterPort{router_index,router_port:port_index};
				if rev_location != back
				{
					return Err(error!(inconsistent_wiring).with_message(format!("Non-matching port ({},{}) to {:?} non-returns, it goes to {:?}.",router_index,port_index,neighbour_location,rev_location)));
				}
				if link_class!=rev_link_class
				{
					return Err(error!(inconsistent_wiring).with_message(format!("port {} at router {} has non-matching link class {} vs {}",port_index,router_index,link_class,rev_link_class)));
				}
			}
		}
		Ok(())
	}
}
