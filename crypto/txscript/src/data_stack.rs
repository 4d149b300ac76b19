use crate::num::ScriptNum;
use hnsd_txscript_errors::ScriptError;

pub type Stack = Vec<Vec<u8>>;

pub trait DataStack {
    fn pop_raw<const SIZE: usize>(&mut self) -> Result<[Vec<u8>; SIZE], ScriptError>;
    fn last_raw<const SIZE: usize>(&self) -> Result<[Vec<u8>; SIZE], ScriptError>;

    fn pop_bool(&mut self) -> Result<bool, ScriptError>;
    fn push_bool(&mut self, value: bool);

    fn pop_num(&mut self, minimal: bool, size_limit: usize) -> Result<ScriptNum, ScriptError>;
    fn last_num(&self, minimal: bool, size_limit: usize) -> Result<ScriptNum, ScriptError>;
    fn push_num(&mut self, value: ScriptNum);

    fn drop_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError>;
    fn dup_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError>;
    fn over_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError>;
    fn rot_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError>;
    fn swap_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError>;
}

fn decode_bool(raw: &[u8]) -> bool {
    match raw.split_last() {
        None => false,
        Some((&last, rest)) => last & 0x7f != 0 || rest.iter().any(|&b| b != 0),
    }
}

impl DataStack for Stack {
    #[inline]
    fn pop_raw<const SIZE: usize>(&mut self) -> Result<[Vec<u8>; SIZE], ScriptError> {
        if self.len() < SIZE {
            return Err(ScriptError::EmptyStack(self.len()));
        }
        Ok(<[Vec<u8>; SIZE]>::try_from(self.split_off(self.len() - SIZE)).expect("exact length"))
    }

    #[inline]
    fn last_raw<const SIZE: usize>(&self) -> Result<[Vec<u8>; SIZE], ScriptError> {
        if self.len() < SIZE {
            return Err(ScriptError::EmptyStack(self.len()));
        }
        Ok(<[Vec<u8>; SIZE]>::try_from(self[self.len() - SIZE..].to_vec()).expect("exact length"))
    }

    #[inline]
    fn pop_bool(&mut self) -> Result<bool, ScriptError> {
        let [raw] = self.pop_raw::<1>()?;
        Ok(decode_bool(&raw))
    }

    #[inline]
    fn push_bool(&mut self, value: bool) {
        self.push(if value { vec![1] } else { vec![] });
    }

    #[inline]
    fn pop_num(&mut self, minimal: bool, size_limit: usize) -> Result<ScriptNum, ScriptError> {
        let [raw] = self.pop_raw::<1>()?;
        ScriptNum::deserialize(&raw, minimal, size_limit)
    }

    #[inline]
    fn last_num(&self, minimal: bool, size_limit: usize) -> Result<ScriptNum, ScriptError> {
        let [raw] = self.last_raw::<1>()?;
        ScriptNum::deserialize(&raw, minimal, size_limit)
    }

    #[inline]
    fn push_num(&mut self, value: ScriptNum) {
        self.push(value.serialize());
    }

    #[inline]
    fn drop_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError> {
        if self.len() < SIZE {
            return Err(ScriptError::EmptyStack(self.len()));
        }
        self.truncate(self.len() - SIZE);
        Ok(())
    }

    #[inline]
    fn dup_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError> {
        if self.len() < SIZE {
            return Err(ScriptError::EmptyStack(self.len()));
        }
        let start = self.len() - SIZE;
        let dup = self[start..].to_vec();
        self.extend(dup);
        Ok(())
    }

    #[inline]
    fn over_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError> {
        if self.len() < 2 * SIZE {
            return Err(ScriptError::EmptyStack(self.len()));
        }
        let start = self.len() - 2 * SIZE;
        let over = self[start..start + SIZE].to_vec();
        self.extend(over);
        Ok(())
    }

    #[inline]
    fn rot_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError> {
        if self.len() < 3 * SIZE {
            return Err(ScriptError::EmptyStack(self.len()));
        }
        let drained: Vec<_> = self.drain(self.len() - 3 * SIZE..self.len() - 2 * SIZE).collect();
        self.extend(drained);
        Ok(())
    }

    #[inline]
    fn swap_item<const SIZE: usize>(&mut self) -> Result<(), ScriptError> {
        if self.len() < 2 * SIZE {
            return Err(ScriptError::EmptyStack(self.len()));
        }
        let drained: Vec<_> = self.drain(self.len() - 2 * SIZE..self.len() - SIZE).collect();
        self.extend(drained);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_encoding() {
        let mut s: Stack = vec![];
        s.push_bool(true);
        assert!(s.pop_bool().unwrap());
        s.push_bool(false);
        assert!(!s.pop_bool().unwrap());
    }

    #[test]
    fn test_num_round_trip() {
        let mut s: Stack = vec![];
        s.push_num(ScriptNum(12345));
        assert_eq!(s.pop_num(true, 8).unwrap().as_i64(), 12345);
    }

    #[test]
    fn test_shuffle_ops() {
        let mut s: Stack = vec![vec![1], vec![2], vec![3]];
        s.swap_item::<1>().unwrap();
        assert_eq!(s, vec![vec![1], vec![3], vec![2]]);

        let mut s: Stack = vec![vec![1], vec![2], vec![3]];
        s.rot_item::<1>().unwrap();
        assert_eq!(s, vec![vec![2], vec![3], vec![1]]);

        let mut s: Stack = vec![vec![1], vec![2]];
        s.over_item::<1>().unwrap();
        assert_eq!(s, vec![vec![1], vec![2], vec![1]]);
    }

    #[test]
    fn test_empty_stack_errors() {
        let mut s: Stack = vec![];
        assert!(matches!(s.pop_bool(), Err(ScriptError::EmptyStack(0))));
        assert!(matches!(s.drop_item::<1>(), Err(ScriptError::EmptyStack(0))));
    }
}
