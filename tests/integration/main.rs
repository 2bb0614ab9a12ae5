mod fetch;
mod mocks;
