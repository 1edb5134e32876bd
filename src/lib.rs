/*!
caminos-dragonfly
=====

This crate provides the routing engine of the routers of a dragonfly network, to be embedded in a router model of a simulator. It covers the translation of endpoint identifiers into hierarchical addresses, the group routing table shared by all routers, the virtual networks, and the minimal, Valiant and adaptive-local routing algorithms.

# Usage

```toml
[dependencies]
caminos-dragonfly = "0.1"
```

A simulation reads a [DragonflyConfiguration], builds a single [RouteToGroup] table and gives a view of it to the [DragonflyRouting] of each router.

```ignore
let configuration = DragonflyConfiguration::from_file(Path::new("dragonfly.cfg"))?;
let table = configuration.route_table()?;
let parameters = configuration.parameters;
let num_vcs = configuration.virtual_networks()?.total_virtual_channels();
let mut routers = (0..parameters.num_routers()).map(|index|
	DragonflyRouting::new(&configuration,table.clone(),index,parameters.radix(),num_vcs)
).collect::<Result<Vec<_>,Error>>()?;
//A host of router 0 injects a packet for endpoint 100.
let mut event = routers[0].process_input(RouterEvent{source:0,destination:100,virtual_network:0,size_in_bits:512})?;
let egress = routers[0].route(0,event.virtual_channel,&mut event)?;
```

The router owning the routing is expected to inject its output credit and queue length arrays with `set_output_credit_array` and `set_output_queue_length_array` when using adaptive routing. They are indexed by `port*num_vcs+vc`.

# Configuration Syntax

The configuration files are parsed using the `gramatica` crate into a `ConfigurationValue`, the same format of the CAMINOS simulator.

* An `Object` is typed `Name { key1 : value1, key2 : value2, [...] }`.
* An `Array` is typed `[value1, value2, value3, [...]]`.
* A `Number` can be written like 2 or 3.1. Stored as a `f64`.
* A `Literal` is a double-quoted string.
* `True` is written `true` and `False` is written `false`.

## Example

```ignore
Dragonfly
{
	hosts_per_router: 4,//P
	routers_per_group: 4,//A
	intergroup_per_router: 4,//H
	num_groups: 9,//G
	intergroup_links: 1,//N, parallel links between each pair of groups
	algorithm: ["minimal","adaptive-local"],//one per virtual network
	adaptive_threshold: 2.0,
	global_route_mode: "relative",
	link_slot_policy: SourceHash,
	seed: 42,
}
```

See [config] for every field.

# Logging

Messages are emitted through the `log` crate. Construction and configuration report at `debug` level, and each routing decision at `trace` level. Errors are never logged here, they are returned as [Error].

*/

pub use quantifiable_derive::Quantifiable;//the derive macro

pub mod error;
pub mod config_parser;
pub mod config;
pub mod quantify;
pub mod matrix;
pub mod topology;
pub mod routing;
pub mod event;

pub use error::{Error,ErrorKind};
pub use config::DragonflyConfiguration;
pub use topology::dragonfly::{DragonflyAddress,DragonflyParameters,GlobalLinkMap,GlobalRouteMode};
pub use routing::{CandidateEgress,RouteAlgorithm,LinkSlotPolicy};
pub use routing::table::{RouteToGroup,RouteToGroupBuilder,RouterPortPair};
pub use routing::dragonfly::{DragonflyRouting,PortState};
pub use event::{DragonflyEvent,RouterEvent,INIT_BROADCAST_ADDRESS};
