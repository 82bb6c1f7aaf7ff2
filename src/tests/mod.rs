mod test_transform;
mod test_validator;
