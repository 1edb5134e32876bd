
use std::mem::{size_of};
use crate::quantify::Quantifiable;

///A simple row-major matrix. Used as backing store of the group routing table and for the distance and trunking matrices of the topology.
#[derive(Clone,Debug,PartialEq)]
pub struct Matrix<T>
{
	data: Vec<T>,
	num_columns: usize,
}

impl<T> Matrix<T>
{
	///Read a matrix entry.
	pub fn get(&self,row:usize,column:usize) -> &T
	{
		&self.data[row*self.num_columns+column]
	}
	///Read a matrix entry, or `None` when `(row,column)` is outside the matrix.
	pub fn try_get(&self,row:usize,column:usize) -> Option<&T>
	{
		if column>=self.num_columns
		{
			return None;
		}
		self.data.get(row*self.num_columns+column)
	}
	///Read/write a matrix entry.
	pub fn get_mut(&mut self,row:usize,column:usize) -> &mut T
	{
		&mut self.data[row*self.num_columns+column]
	}
	///Read/write a matrix entry, or `None` when `(row,column)` is outside the matrix.
	pub fn try_get_mut(&mut self,row:usize,column:usize) -> Option<&mut T>
	{
		if column>=self.num_columns
		{
			return None;
		}
		self.data.get_mut(row*self.num_columns+column)
	}
	///Get the number of rows
	pub fn get_rows(&self) -> usize
	{
		if self.num_columns==0 { 0 } else { self.data.len()/self.num_columns }
	}
	///Get the number of columns
	pub fn get_columns(&self) -> usize
	{
		self.num_columns
	}
	///Build a matrix with constant values.
	pub fn constant(value:T,num_rows:usize,num_columns:usize) -> Matrix<T> where T:Clone
	{
		Matrix{
			data: vec![value;num_rows*num_columns],
			num_columns,
		}
	}
	pub fn map<U,F:FnMut(&T)->U>(&self, f:F) -> Matrix<U>
	{
		Matrix{
			data: self.data.iter().map(f).collect(),
			num_columns: self.num_columns,
		}
	}
	///Iterate over the entries `(row,column)` with `row!=column`.
	pub fn outside_diagonal(&self) -> impl Iterator<Item=&T>
	{
		let num_columns = self.num_columns;
		self.data.iter().enumerate().filter_map(move |(index,value)|{
			if index/num_columns != index%num_columns { Some(value) } else { None }
		})
	}
}

impl<T:Quantifiable> Quantifiable for Matrix<T>
{
	fn total_memory(&self) -> usize
	{
		return size_of::<Matrix<T>>() + self.data.total_memory();
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
