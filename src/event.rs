/*!

The packets as seen by the routers.

An endpoint injects a [RouterEvent]. The first router wraps it into a [DragonflyEvent] with its hierarchical destination and the routing decisions taken so far, and that same event travels hop by hop until delivery.

Events are serialized with `bincode` for checkpoints and for transfers between partitions. The order of the fields is part of the format: request header, virtual channel, source group, destination group, intermediate group, shadow intermediate group, destination router, destination host, link slot and shadow link slot.

*/

use serde::{Serialize,Deserialize};
use quantifiable_derive::Quantifiable;//the derive macro
use crate::topology::dragonfly::DragonflyAddress;
use crate::error::Error;
use crate::error;

///Destination of initialization data that must reach every router.
pub const INIT_BROADCAST_ADDRESS: usize = usize::MAX;

///A request made by an endpoint.
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize,Quantifiable)]
pub struct RouterEvent
{
	pub source: usize,
	///Endpoint identifier or `INIT_BROADCAST_ADDRESS`.
	pub destination: usize,
	pub virtual_network: usize,
	pub size_in_bits: usize,
}

///A request in flight through the dragonfly.
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize,Quantifiable)]
pub struct DragonflyEvent
{
	pub request: RouterEvent,
	///The virtual channel the packet occupies. Updated by the routing at each hop.
	pub virtual_channel: usize,
	pub src_group: u32,
	pub dest: DragonflyAddress,
	///Link slot used to reach `dest.mid_group`.
	pub global_slice: u16,
	///Link slot of the alternative path. For adaptive packets at the source it is the slot toward `dest.mid_group_shadow`;
	///once a packet takes an intermediate group it keeps the slot the minimal path would have used.
	pub global_slice_shadow: u16,
}

impl DragonflyEvent
{
	pub fn encode(&self) -> Result<Vec<u8>,Error>
	{
		bincode::serialize(self).map_err(|e|error!(could_not_encode_event,e))
	}
	pub fn decode(bytes:&[u8]) -> Result<DragonflyEvent,Error>
	{
		bincode::deserialize(bytes).map_err(|e|error!(could_not_decode_event,e))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn valiant_event() -> DragonflyEvent
	{
		DragonflyEvent{
			request: RouterEvent{source:0,destination:100,virtual_network:1,size_in_bits:512},
			virtual_channel: 3,
			src_group: 0,
			dest: DragonflyAddress{group:6,mid_group:3,mid_group_shadow:3,router:1,host:0},
			global_slice: 1,
			global_slice_shadow: 0xbeef,
		}
	}

	#[test]
	fn round_trip_keeps_every_field()
	{
		let mut event = valiant_event();
		let decoded = DragonflyEvent::decode(&event.encode().expect("encodable")).expect("decodable");
		assert_eq!(decoded,event);
		event.request.destination = INIT_BROADCAST_ADDRESS;
		event.dest = DragonflyAddress::broadcast();
		event.global_slice = u16::MAX;
		let decoded = DragonflyEvent::decode(&event.encode().expect("encodable")).expect("decodable");
		assert_eq!(decoded,event);
		assert!(decoded.dest.is_broadcast());
	}

	#[test]
	fn field_layout()
	{
		let bytes = valiant_event().encode().expect("encodable");
		//Four 64 bit header fields, the 64 bit virtual channel, six 32 bit fields and two 16 bit slots.
		assert_eq!(bytes.len(),4*8+8+6*4+2*2);
		assert_eq!(&bytes[8..16],&100u64.to_le_bytes());
		assert_eq!(&bytes[32..40],&3u64.to_le_bytes());
		//dest.group, dest.mid_group, dest.mid_group_shadow, dest.router
		assert_eq!(&bytes[44..48],&6u32.to_le_bytes());
		assert_eq!(&bytes[48..52],&3u32.to_le_bytes());
		assert_eq!(&bytes[52..56],&3u32.to_le_bytes());
		assert_eq!(&bytes[56..60],&1u32.to_le_bytes());
		assert_eq!(&bytes[64..66],&1u16.to_le_bytes());
		assert_eq!(&bytes[66..68],&0xbeefu16.to_le_bytes());
	}

	#[test]
	fn truncated_input_fails()
	{
		let bytes = valiant_event().encode().expect("encodable");
		let error = DragonflyEvent::decode(&bytes[..bytes.len()-1]).unwrap_err();
		assert!(matches!(error.kind,crate::error::ErrorKind::CouldNotDecodeEvent{..}));
	}
}
