/*!

Errors of the dragonfly routing component. Every failure here is a configuration or topology mismatch that invalidates the whole run, so nothing is retried: the error travels up with `?` until the enclosing router aborts the simulation with the printed message.

Instead of `expect` or `unwrap_or_else` try
* `map_err` like in `.map_err(|e|error!(could_not_decode_event,e))?;`
* `ok_or_else` like in `.ok_or_else( ||error!(unreachable_group,group,slot) )?;`

Instead of `panic!` try
* Return an error. E.g., by `return Err( error!(endpoint_out_of_range,id,limit) );`

*/

use std::fmt::{Display,Formatter};
use std::path::PathBuf;
use crate::config_parser::ConfigurationValue;

/// The main Error class to be used in each `Result(Whatever,Error)`.
/// It contains the code source of the error and its kind.
/// An arbitrary `String` message can be optionally attached.
#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

/// A source code location where an error occurred.
/// Contains the values of the macros `std::{file,line,column}`.
#[derive(Debug)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

#[derive(Debug)]
pub enum ErrorKind
{
	/// The structural parameters do not describe a buildable dragonfly.
	/// E.g., a radix different from `P+(A-1)+H` or a zero-sized dimension.
	InconsistentParameters,
	/// An endpoint identifier outside `[0,P*A*G)`.
	EndpointOutOfRange{
		endpoint: usize,
		limit: usize,
	},
	/// A group table access outside its dimensions.
	GroupTableIndexOutOfRange{
		group: usize,
		slot: usize,
		groups: usize,
		slots: usize,
	},
	/// The group table has no router/port for this destination.
	UnreachableGroup{
		group: usize,
		slot: usize,
	},
	TableNotInitialized,
	TableAlreadyInitialized,
	/// A virtual network with no routing algorithm configured.
	MissingRoutingAlgorithm{
		virtual_network: usize,
	},
	UnknownRoutingAlgorithm{
		name: String,
	},
	VirtualChannelOutOfRange{
		virtual_channel: usize,
		limit: usize,
	},
	PortOutOfRange{
		port: usize,
		radix: usize,
	},
	/// Some configuration value could not be understood.
	/// Keep the offending value.
	IllFormedConfiguration{
		value: ConfigurationValue,
	},
	/// The global links do not pair up between groups.
	InconsistentWiring,
	CouldNotOpenFile{
		filepath: PathBuf,
		error:std::io::Error,
	},
	CouldNotParseFile{
		filepath: PathBuf,
	},
	CouldNotEncodeEvent{
		error: bincode::Error,
	},
	CouldNotDecodeEvent{
		error: bincode::Error,
	},
	/// The enclosing router held a mutable borrow of a congestion array while asking for a route.
	CongestionArrayBusy{
		array: String,
	},
	/// Any other error. Better to add new types than to use this thing.
	Undetermined,
}

// source_location!()
#[macro_export]
macro_rules! source_location{
	() => {
		$crate::error::SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	}
}

/// Build an `Error` of the given kind at the current source location.
/// `error!(unreachable_group,group,slot)` is `Error::unreachable_group(source_location!(),group,slot)`.
#[macro_export]
macro_rules! error{
	($kind:ident) => {
		$crate::error::Error::$kind($crate::source_location!())
	};
	($kind:ident,$($arg:expr),+ $(,)?) => {
		$crate::error::Error::$kind($crate::source_location!(),$($arg),+)
	};
}

use ErrorKind::*;

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{
			source_location,
			kind,
			message:None,
		}
	}
	pub fn with_message(mut self,message:String) -> Error
	{
		self.message=Some(message);
		self
	}
	pub fn inconsistent_parameters(source_location:SourceLocation)->Error
	{
		Error::new(source_location,InconsistentParameters)
	}
	pub fn endpoint_out_of_range(source_location:SourceLocation,endpoint:usize,limit:usize)->Error
	{
		Error::new(source_location,EndpointOutOfRange{endpoint,limit})
	}
	pub fn group_table_index_out_of_range(source_location:SourceLocation,group:usize,slot:usize,groups:usize,slots:usize)->Error
	{
		Error::new(source_location,GroupTableIndexOutOfRange{group,slot,groups,slots})
	}
	pub fn unreachable_group(source_location:SourceLocation,group:usize,slot:usize)->Error
	{
		Error::new(source_location,UnreachableGroup{group,slot})
	}
	pub fn table_not_initialized(source_location:SourceLocation)->Error
	{
		Error::new(source_location,TableNotInitialized)
	}
	pub fn table_already_initialized(source_location:SourceLocation)->Error
	{
		Error::new(source_location,TableAlreadyInitialized)
	}
	pub fn missing_routing_algorithm(source_location:SourceLocation,virtual_network:usize)->Error
	{
		Error::new(source_location,MissingRoutingAlgorithm{virtual_network})
	}
	pub fn unknown_routing_algorithm(source_location:SourceLocation,name:String)->Error
	{
		Error::new(source_location,UnknownRoutingAlgorithm{name})
	}
	pub fn virtual_channel_out_of_range(source_location:SourceLocation,virtual_channel:usize,limit:usize)->Error
	{
		Error::new(source_location,VirtualChannelOutOfRange{virtual_channel,limit})
	}
	pub fn port_out_of_range(source_location:SourceLocation,port:usize,radix:usize)->Error
	{
		Error::new(source_location,PortOutOfRange{port,radix})
	}
	pub fn ill_formed_configuration(source_location:SourceLocation,value:ConfigurationValue)->Error
	{
		Error::new(source_location,IllFormedConfiguration{value})
	}
	pub fn inconsistent_wiring(source_location:SourceLocation)->Error
	{
		Error::new(source_location,InconsistentWiring)
	}
	pub fn could_not_open_file(source_location:SourceLocation,filepath:PathBuf,error:std::io::Error)->Error
	{
		Error::new(source_location,CouldNotOpenFile{filepath,error})
	}
	pub fn could_not_parse_file(source_location:SourceLocation,filepath:PathBuf)->Error
	{
		Error::new(source_location,CouldNotParseFile{filepath})
	}
	pub fn could_not_encode_event(source_location:SourceLocation,error:bincode::Error)->Error
	{
		Error::new(source_location,CouldNotEncodeEvent{error})
	}
	pub fn could_not_decode_event(source_location:SourceLocation,error:bincode::Error)->Error
	{
		Error::new(source_location,CouldNotDecodeEvent{error})
	}
	pub fn congestion_array_busy(source_location:SourceLocation,array:String)->Error
	{
		Error::new(source_location,CongestionArrayBusy{array})
	}
	pub fn undetermined(source_location:SourceLocation)->Error
	{
		Error::new(source_location,Undetermined)
	}
}


impl Display for Error
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		let Error{source_location:location,kind,message} = self;
		writeln!(formatter,"Error at file {} at line {} column {}.",location.file,location.line,location.column)?;
		if let Some(text) = message
		{
			writeln!(formatter,"{}",text)?;
		}
		kind.fmt(formatter)?;
		Ok(())
	}
}

impl std::error::Error for Error {}

impl Display for ErrorKind
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		match self
		{
			InconsistentParameters =>
			{
				writeln!(formatter,"InconsistentParameters error: the dragonfly parameters do not describe a valid network.")?;
			},
			EndpointOutOfRange{endpoint,limit} =>
			{
				writeln!(formatter,"EndpointOutOfRange error: endpoint {} is not in [0,{}).",endpoint,limit)?;
			},
			GroupTableIndexOutOfRange{group,slot,groups,slots} =>
			{
				writeln!(formatter,"GroupTableIndexOutOfRange error: entry ({},{}) requested from a table of {}x{} entries.",group,slot,groups,slots)?;
			},
			UnreachableGroup{group,slot} =>
			{
				writeln!(formatter,"UnreachableGroup error: no global link configured for table row {} and slot {}.",group,slot)?;
			},
			TableNotInitialized =>
			{
				writeln!(formatter,"TableNotInitialized error: the group table was read before being initialized.")?;
			},
			TableAlreadyInitialized =>
			{
				writeln!(formatter,"TableAlreadyInitialized error: the group table can only be initialized once.")?;
			},
			MissingRoutingAlgorithm{virtual_network} =>
			{
				writeln!(formatter,"MissingRoutingAlgorithm error: virtual network {} has no routing algorithm.",virtual_network)?;
			},
			UnknownRoutingAlgorithm{name} =>
			{
				writeln!(formatter,"UnknownRoutingAlgorithm error: `{}` is not one of minimal, valiant or adaptive-local.",name)?;
			},
			VirtualChannelOutOfRange{virtual_channel,limit} =>
			{
				writeln!(formatter,"VirtualChannelOutOfRange error: virtual channel {} is not in [0,{}).",virtual_channel,limit)?;
			},
			PortOutOfRange{port,radix} =>
			{
				writeln!(formatter,"PortOutOfRange error: port {} on a router of radix {}.",port,radix)?;
			},
			IllFormedConfiguration{value} =>
			{
				writeln!(formatter,"IllFormedConfiguration error: the following value could not be understood.\n{}",value)?;
			},
			InconsistentWiring =>
			{
				writeln!(formatter,"InconsistentWiring error: some global link does not return to its origin.")?;
			},
			CouldNotOpenFile{filepath,error} =>
			{
				writeln!(formatter,"CouldNotOpenFile error: The file {:?} could not be opened.\nio_error: {}",filepath,error)?;
			},
			CouldNotParseFile{filepath} =>
			{
				writeln!(formatter,"CouldNotParseFile error: The file {:?} could not be parsed.",filepath)?;
			},
			CouldNotEncodeEvent{error} =>
			{
				writeln!(formatter,"CouldNotEncodeEvent error: bincode_error: {}",error)?;
			},
			CouldNotDecodeEvent{error} =>
			{
				writeln!(formatter,"CouldNotDecodeEvent error: bincode_error: {}",error)?;
			},
			CongestionArrayBusy{array} =>
			{
				writeln!(formatter,"CongestionArrayBusy error: the {} array was being modified while routing.",array)?;
			},
			Undetermined =>
			{
				writeln!(formatter,"Undetermined error: A generic error. The concrete error should be more specified.")?;
			},
		}
		Ok(())
	}
}
