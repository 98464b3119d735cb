//! Incremental parsing from a reader into a growable ring buffer.

use nom::error::VerboseError;
use nom::{Err, IResult, Offset};
use std::io::Read;

pub struct ParseBuffer<R, P, F> {
    pub buf: circular::Buffer,
    pub read: R,
    pub parse: P,
    pub fail: F,
}

impl<O, R: Read, P, F> Iterator for ParseBuffer<R, P, F>
where
    P: Fn(&[u8]) -> IResult<&[u8], O, VerboseError<&[u8]>>,
    F: Fn(Err<VerboseError<&[u8]>>) -> String,
{
    type Item = Result<O, String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (self.parse)(self.buf.data()) {
                Err(Err::Incomplete(_)) => {
                    // ensure that we have some space available in the buffer
                    if self.buf.available_space() == 0 {
                        if self.buf.position() == 0 {
                            // double buffer capacity
                            self.buf.grow(self.buf.capacity() * 2);
                        } else {
                            self.buf.shift();
                        }
                    }

                    // read from file to free space of buffer
                    let read_bytes = match self.read.read(self.buf.space()) {
                        Ok(read_bytes) => read_bytes,
                        Err(e) => break Some(Err(e.to_string())),
                    };
                    self.buf.fill(read_bytes);

                    if self.buf.available_data() == 0 {
                        // no more data to read or parse, stopping the reading loop
                        break None;
                    } else if read_bytes == 0 {
                        break Some(Err("incomplete parse at end of input".to_string()));
                    }
                }

                Err(e) => break Some(Err((self.fail)(e))),

                Ok((remaining, toplevel)) => {
                    self.buf.consume(self.buf.data().offset(remaining));
                    break Some(Ok(toplevel));
                }
            }
        }
    }
}
