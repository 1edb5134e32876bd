
use std::mem::{size_of,size_of_val};
use std::rc::Rc;
use std::sync::Arc;
use std::cell::{Cell,RefCell};
use rand::rngs::StdRng;

// This is similar to https://docs.rs/heapsize/0.4.2/heapsize/ as noted by notriddle
// heapsize derive macro is at https://docs.rs/heapsize_derive/0.1.4/src/heapsize_derive/lib.rs.html#5-108 , as pointed by droundy

pub trait Quantifiable
{
	/// Get the total memory currently being employed by the implementing type. Both stack and heap.
	fn total_memory(&self) -> usize;
	/// Prints by stdout how much memory is used per component.
	fn print_memory_breakdown(&self);
	/// Get an estimation on how much memory the type could reach during the simulation.
	fn forecast_total_memory(&self) -> usize;
}

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		return size_of::<Vec<T>>() + self.iter().map(|e|e.total_memory()).sum::<usize>() + (self.capacity()-self.len())*size_of::<T>();
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

impl<A:Quantifiable, B:Quantifiable> Quantifiable for (A,B)
{
	fn total_memory(&self) -> usize
	{
		return self.0.total_memory()+self.1.total_memory();
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

macro_rules! quantifiable_simple
{
	($t:ty) =>
	{
		impl Quantifiable for $t
		{
			fn total_memory(&self) -> usize
			{
				return size_of::<$t>();
			}
			fn print_memory_breakdown(&self)
			{
				unimplemented!();
			}
			fn forecast_total_memory(&self) -> usize
			{
				return size_of::<$t>();
			}
		}
	}
}

quantifiable_simple!(bool);
quantifiable_simple!(u16);
quantifiable_simple!(u32);
quantifiable_simple!(i32);
quantifiable_simple!(i64);
quantifiable_simple!(usize);
quantifiable_simple!(f64);
//The generator state lives inline.
quantifiable_simple!(StdRng);

impl Quantifiable for String
{
	fn total_memory(&self) -> usize
	{
		return size_of::<String>() + self.capacity();
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

impl<T:?Sized> Quantifiable for Rc<T>
{
	fn total_memory(&self) -> usize
	{
		return size_of::<Rc<T>>();
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

///Only the pointer. The shared value is accounted by whoever built it.
impl<T:?Sized> Quantifiable for Arc<T>
{
	fn total_memory(&self) -> usize
	{
		return size_of::<Arc<T>>();
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		return size_of::<Arc<T>>();
	}
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		match self
		{
			&None => size_of::<Option<T>>(),
			&Some(ref thing) => thing.total_memory(),
		}
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

impl<T:Quantifiable+Copy> Quantifiable for Cell<T>
{
	fn total_memory(&self) -> usize
	{
		size_of_val(self)
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of_val(self)
	}
}

impl<T:Quantifiable+?Sized> Quantifiable for RefCell<T>
{
	fn total_memory(&self) -> usize
	{
		//Note: BorrowFlag=isize (at 15/3/2019)
		self.borrow().total_memory() + size_of_val(self)
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

pub fn human_bytes(byte_amount:usize) -> String
{
	if byte_amount<3000
	{
		return format!("{} bytes",byte_amount);
	}
	let kb_amount=byte_amount as f64 / 1024.;
	if kb_amount<3000f64
	{
		return format!("{} KB",kb_amount);
	}
	let mb_amount=kb_amount / 1024.;
	if mb_amount<3000f64
	{
		return format!("{} MB",mb_amount);
	}
	let gb_amount=mb_amount / 1024.;
	return format!("{} GB",gb_amount);
}
